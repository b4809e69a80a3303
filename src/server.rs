// ABOUTME: Static file server for the slidedown output directory
// ABOUTME: Serves index.html, the bundles and any other file under the output root over HTTP

use log::{debug, error, info};
use percent_encoding::percent_decode_str;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use url::Url;

use crate::errors::{Result, SlidedownError};

/// HTTP server rooted at the output directory
pub struct AssetServer {
    root: PathBuf,
    server: Server,
}

impl AssetServer {
    /// Bind to `port` on all interfaces; port 0 picks a free port
    pub fn bind(root: impl Into<PathBuf>, port: u16) -> Result<Self> {
        let server = Server::http(format!("0.0.0.0:{}", port)).map_err(|e| {
            SlidedownError::ServerError(format!("Failed to start HTTP server: {}", e))
        })?;
        Ok(Self {
            root: root.into(),
            server,
        })
    }

    /// The port actually bound
    pub fn port(&self) -> Option<u16> {
        self.server.server_addr().to_ip().map(|addr| addr.port())
    }

    /// Serve requests on a background thread for the rest of the process
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || {
            if let Some(port) = self.port() {
                info!("HTTP server listening on http://localhost:{}", port);
            }
            for request in self.server.incoming_requests() {
                handle_request(&self.root, request);
            }
        })
    }
}

fn handle_request(root: &Path, request: Request) {
    if !matches!(request.method(), Method::Get | Method::Head) {
        let response = Response::from_string("405 Method Not Allowed")
            .with_status_code(StatusCode(405));
        let _ = request.respond(response);
        return;
    }

    let file_path = resolve_request_path(root, request.url());
    debug!("Request for {:?} -> {:?}", request.url(), file_path);

    let Some(file_path) = file_path.filter(|p| p.is_file()) else {
        let response = Response::from_string("404 Not Found").with_status_code(StatusCode(404));
        let _ = request.respond(response);
        return;
    };

    match fs::read(&file_path) {
        Ok(content) => {
            let mut response = Response::from_data(content);
            if let Ok(header) = Header::from_bytes("Content-Type", content_type(&file_path)) {
                response = response.with_header(header);
            }
            if let Err(e) = request.respond(response) {
                error!("Failed to send response: {}", e);
            }
        }
        Err(e) => {
            error!("Failed to read file {:?}: {}", file_path, e);
            let response = Response::from_string(format!("Failed to read file: {}", e))
                .with_status_code(StatusCode(500));
            let _ = request.respond(response);
        }
    }
}

/// Map a request target such as `/css/style.css?v=2` to a file under `root`.
///
/// Dot segments are collapsed before mapping, so the result never leaves
/// `root`. A directory maps to its `index.html`.
pub fn resolve_request_path(root: &Path, target: &str) -> Option<PathBuf> {
    let base = Url::parse("http://localhost/").ok()?;
    let url = base.join(target).ok()?;

    let mut path = root.to_path_buf();
    for segment in url.path_segments()? {
        if segment.is_empty() {
            continue;
        }
        let decoded = percent_decode_str(segment).decode_utf8().ok()?;
        if decoded == "." || decoded == ".." || decoded.contains(['/', '\\']) {
            return None;
        }
        path.push(decoded.as_ref());
    }

    if path.is_dir() {
        path.push("index.html");
    }
    Some(path)
}

/// Content type by file extension
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript; charset=utf-8",
        "json" => "application/json",
        "txt" | "md" => "text/plain; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

use super::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent dir");
    fs::write(path, content).expect("Failed to write file");
}

#[test]
fn test_substitute_title_replaces_every_placeholder() {
    let header = "<title>%=title=%</title><h1>%=TITLE=%</h1>";
    let result = html::substitute_title(header, "Rust Deck");
    assert_eq!(result, "<title>Rust Deck</title><h1>Rust Deck</h1>");
}

#[test]
fn test_substitute_title_is_literal() {
    // `$1` must not be treated as a capture reference
    let result = html::substitute_title("<title>%=title=%</title>", "Costs $1 & more");
    assert_eq!(result, "<title>Costs $1 & more</title>");
}

#[test]
fn test_substitute_title_without_placeholder() {
    let header = "<title>Fixed</title>";
    assert_eq!(html::substitute_title(header, "Ignored"), header);
}

#[test]
fn test_assemble_page_concatenates_raw() {
    let renderer = |s: &str| format!("<p>{}</p>", s.trim());
    let page = html::assemble_page("<body>", "hello\n", "</body>", &renderer);
    assert_eq!(page, "<body><p>hello</p></body>");
}

#[test]
fn test_comrak_renderer_allows_raw_html() {
    let rendered = ComrakRenderer.render("# Title\n\n<div class=\"note\">raw</div>\n");
    assert!(rendered.contains("<h1>Title</h1>"));
    assert!(rendered.contains("<div class=\"note\">raw</div>"));
}

#[test]
fn test_concat_files_keeps_order_and_duplicates() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let a = temp_dir.path().join("a.js");
    let b = temp_dir.path().join("b.js");
    write_file(&a, "A;");
    write_file(&b, "B;");

    let bundle = resources::concat_files(&[b.clone(), a.clone(), b.clone()]).unwrap();
    assert_eq!(bundle, b"B;A;B;");
}

#[test]
fn test_concat_files_passes_non_utf8_bytes_through() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let latin1 = temp_dir.path().join("latin1.css");
    let plain = temp_dir.path().join("plain.css");
    fs::write(&latin1, b"/* caf\xe9 */\n").expect("Failed to write file");
    write_file(&plain, "p{}");

    let bundle = resources::concat_files(&[latin1, plain]).unwrap();
    assert_eq!(bundle, b"/* caf\xe9 */\np{}");
}

#[test]
fn test_concat_files_reports_missing_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("missing.css");

    let err = resources::concat_files(&[missing.clone()]).unwrap_err();
    match err {
        SlidedownError::FileReadError { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_install_layout_paths() {
    let layout = InstallLayout::new("/opt/slidedown");
    assert_eq!(
        layout.extension_script("goto"),
        Path::new("/opt/slidedown/deck.js/extensions/goto/deck.goto.js")
    );
    assert_eq!(
        layout.extension_style("goto"),
        Path::new("/opt/slidedown/deck.js/extensions/goto/deck.goto.css")
    );
    assert_eq!(
        layout.template_dir("remies"),
        Path::new("/opt/slidedown/template/remies")
    );
}

#[test]
fn test_sequences_have_fixed_bookends() {
    let layout = InstallLayout::new("/opt/slidedown");
    let extensions = vec!["menu".to_string(), "goto".to_string()];

    let scripts = layout.script_sequence(&extensions);
    assert_eq!(
        scripts,
        vec![
            layout.core_script(),
            layout.extension_script("menu"),
            layout.extension_script("goto"),
            layout.finalizer_script(),
        ]
    );

    let styles = layout.style_sequence(&extensions);
    assert_eq!(
        styles,
        vec![
            layout.core_style(),
            layout.extension_style("menu"),
            layout.extension_style("goto"),
        ]
    );

    assert_eq!(
        layout.script_sequence(&[]),
        vec![layout.core_script(), layout.finalizer_script()]
    );
}

#[test]
fn test_project_descriptor_absent_vs_malformed() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(config::PROJECT_CONFIG_FILE);

    assert!(matches!(config::ProjectDescriptor::load(&path), Ok(None)));

    write_file(&path, "{ not json");
    assert!(matches!(
        config::ProjectDescriptor::load(&path),
        Err(SlidedownError::ConfigError(_))
    ));
    assert_eq!(
        config::ProjectDescriptor::load_or_default(&path),
        config::ProjectDescriptor::default()
    );
}

#[test]
fn test_project_descriptor_keys() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(config::PROJECT_CONFIG_FILE);
    write_file(
        &path,
        r#"{"title": "Talk", "port": 8123, "publicDir": "out",
            "extensions": ["status"], "unknown": 1}"#,
    );

    let descriptor = config::ProjectDescriptor::load(&path).unwrap().unwrap();
    assert_eq!(descriptor.title.as_deref(), Some("Talk"));
    assert_eq!(descriptor.port, Some(8123));
    assert_eq!(descriptor.public_dir.as_deref(), Some("out"));
    assert_eq!(descriptor.extensions, Some(vec!["status".to_string()]));
    assert_eq!(descriptor.template, None);
}

#[test]
fn test_project_descriptor_drops_only_mistyped_keys() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(config::PROJECT_CONFIG_FILE);
    write_file(
        &path,
        r#"{"title": "Mine", "port": "8080", "source": null, "extensions": "goto"}"#,
    );

    let descriptor = config::ProjectDescriptor::load(&path).unwrap().unwrap();
    assert_eq!(descriptor.title.as_deref(), Some("Mine"));
    assert_eq!(descriptor.port, None);
    assert_eq!(descriptor.source, None);
    assert_eq!(descriptor.extensions, None);
}

#[test]
fn test_template_descriptor_missing_is_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let result = config::TemplateDescriptor::load(&temp_dir.path().join("config.json"));
    assert!(matches!(result, Err(SlidedownError::ConfigError(_))));
}

#[test]
fn test_template_descriptor_without_extensions() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.json");
    write_file(&path, "{}");

    let descriptor = config::TemplateDescriptor::load(&path).unwrap();
    assert_eq!(descriptor.extensions, None);
}

#[test]
fn test_artifact_output_paths() {
    let root = Path::new("/tmp/public");
    assert_eq!(ArtifactKind::Page.output_path(root), root.join("index.html"));
    assert_eq!(
        ArtifactKind::ScriptBundle.output_path(root),
        root.join("js/script.js")
    );
    assert_eq!(
        ArtifactKind::StyleBundle.output_path(root),
        root.join("css/style.css")
    );
}

#[test]
fn test_role_to_kind() {
    assert_eq!(TrackedRole::Source.kind(), ArtifactKind::Page);
    assert_eq!(TrackedRole::Header.kind(), ArtifactKind::Page);
    assert_eq!(TrackedRole::Footer.kind(), ArtifactKind::Page);
    assert_eq!(TrackedRole::Script.kind(), ArtifactKind::ScriptBundle);
    assert_eq!(TrackedRole::Style.kind(), ArtifactKind::StyleBundle);
}

#[test]
fn test_copy_if_absent_never_overwrites() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source = temp_dir.path().join("modernizr.custom.js");
    let target = temp_dir.path().join("public/js/modernizr.custom.js");
    write_file(&source, "v1");

    assert!(utils::copy_if_absent(&source, &target));
    assert_eq!(fs::read_to_string(&target).unwrap(), "v1");

    write_file(&source, "v2");
    assert!(!utils::copy_if_absent(&source, &target));
    assert_eq!(fs::read_to_string(&target).unwrap(), "v1");
}

#[test]
fn test_copy_if_absent_missing_source_is_not_fatal() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let copied = utils::copy_if_absent(
        &temp_dir.path().join("nope.js"),
        &temp_dir.path().join("out/nope.js"),
    );
    assert!(!copied);
}

#[test]
fn test_resolve_request_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    write_file(&root.join("index.html"), "<html></html>");
    write_file(&root.join("css/style.css"), "body{}");

    assert_eq!(
        server::resolve_request_path(root, "/"),
        Some(root.join("index.html"))
    );
    assert_eq!(
        server::resolve_request_path(root, "/css/style.css?v=3"),
        Some(root.join("css").join("style.css"))
    );
    assert_eq!(
        server::resolve_request_path(root, "/my%20notes.txt"),
        Some(root.join("my notes.txt"))
    );
    // Dot segments collapse at the root instead of escaping it
    assert_eq!(
        server::resolve_request_path(root, "/../../etc/passwd"),
        Some(root.join("etc").join("passwd"))
    );
    assert_eq!(server::resolve_request_path(root, "/a%2F..%2F..%2Fsecret"), None);
}

#[test]
fn test_content_type() {
    assert_eq!(
        server::content_type(Path::new("index.html")),
        "text/html; charset=utf-8"
    );
    assert_eq!(
        server::content_type(Path::new("js/script.js")),
        "application/javascript; charset=utf-8"
    );
    assert_eq!(
        server::content_type(Path::new("css/style.CSS")),
        "text/css; charset=utf-8"
    );
    assert_eq!(
        server::content_type(Path::new("archive.bin")),
        "application/octet-stream"
    );
}

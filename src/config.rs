// ABOUTME: Configuration module for the slidedown application
// ABOUTME: Cascades built-in defaults, the template descriptor and slidedown.json into Settings

use crate::errors::{Result, SlidedownError};
use crate::resources::InstallLayout;
use crate::utils;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Project descriptor file, looked up in the project root
pub const PROJECT_CONFIG_FILE: &str = "slidedown.json";

/// Template descriptor file, looked up in the template directory
pub const TEMPLATE_CONFIG_FILE: &str = "config.json";

pub const DEFAULT_TEMPLATE: &str = "remies";
pub const DEFAULT_TITLE: &str = "A slidedown.js presentation";
pub const DEFAULT_SOURCE: &str = "slides.md";
pub const DEFAULT_PUBLIC_DIR: &str = "public";
pub const DEFAULT_PORT: u16 = 9000;

/// Optional per-project overrides read from `slidedown.json`.
///
/// A value of the wrong type drops only that key; the other keys still apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectDescriptor {
    #[serde(deserialize_with = "lenient")]
    pub template: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub templatedir: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub source: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub port: Option<u16>,
    #[serde(rename = "publicDir", deserialize_with = "lenient")]
    pub public_dir: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub header: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub footer: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub extensions: Option<Vec<String>>,
}

/// Accept any JSON value; `null` or a value that does not fit `T` becomes `None`
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match T::deserialize(&value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            warn!("Ignoring project config value {}: {}", value, e);
            Ok(None)
        }
    }
}

impl ProjectDescriptor {
    /// Load the descriptor at `path`.
    ///
    /// `Ok(None)` means there is no file; a file that cannot be read or
    /// parsed is an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = utils::read_text(path)?;
        let descriptor = serde_json::from_str(&text).map_err(|e| {
            SlidedownError::ConfigError(format!("Malformed project config {:?}: {}", path, e))
        })?;
        Ok(Some(descriptor))
    }

    /// Load the descriptor, treating an absent or broken file as empty
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(Some(descriptor)) => {
                info!("Loaded project config {:?}", path);
                descriptor
            }
            Ok(None) => {
                debug!("No project config at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                warn!("Ignoring project config: {}", e);
                Self::default()
            }
        }
    }
}

/// Per-template settings read from `<templatedir>/config.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplateDescriptor {
    pub extensions: Option<Vec<String>>,
}

impl TemplateDescriptor {
    /// Load the template descriptor; it is required, so absence is an error too
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SlidedownError::ConfigError(format!("Cannot read template config {:?}: {}", path, e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            SlidedownError::ConfigError(format!("Malformed template config {:?}: {}", path, e))
        })
    }
}

/// Resolved, immutable settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub project_root: PathBuf,
    pub install: InstallLayout,
    pub template: String,
    pub template_dir: PathBuf,
    pub title: String,
    pub source: PathBuf,
    pub output_root: PathBuf,
    pub header: PathBuf,
    pub footer: PathBuf,
    pub port: u16,
    /// Script bundle inputs in concatenation order
    pub scripts: Vec<PathBuf>,
    /// Stylesheet bundle inputs in concatenation order
    pub styles: Vec<PathBuf>,
}

/// Resolve settings for the project at `project_root` using the installation
/// found from the environment
pub fn resolve(project_root: &Path) -> Result<Settings> {
    let layout = InstallLayout::from_env()?;
    resolve_with_layout(project_root, &layout)
}

/// Resolve settings for the project at `project_root` against `layout`
pub fn resolve_with_layout(project_root: &Path, layout: &InstallLayout) -> Result<Settings> {
    let project = ProjectDescriptor::load_or_default(&project_root.join(PROJECT_CONFIG_FILE));
    resolve_descriptor(project_root, layout, project)
}

/// Apply an already-loaded project descriptor on top of the defaults and the
/// template descriptor
pub fn resolve_descriptor(
    project_root: &Path,
    layout: &InstallLayout,
    project: ProjectDescriptor,
) -> Result<Settings> {
    let ProjectDescriptor {
        template,
        templatedir,
        title,
        source,
        port,
        public_dir,
        header,
        footer,
        extensions,
    } = project;

    let template = non_empty(template).unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());
    let template_dir = non_empty(templatedir)
        .map(|dir| utils::resolve_against(project_root, &dir))
        .unwrap_or_else(|| layout.template_dir(&template));
    let title = non_empty(title).unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let source = utils::resolve_against(
        project_root,
        &non_empty(source).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
    );
    let port = port.filter(|&p| p != 0).unwrap_or(DEFAULT_PORT);
    let output_root = utils::resolve_against(
        project_root,
        &non_empty(public_dir).unwrap_or_else(|| DEFAULT_PUBLIC_DIR.to_string()),
    );
    let header = non_empty(header)
        .map(|path| utils::resolve_against(project_root, &path))
        .unwrap_or_else(|| template_dir.join("header.html"));
    let footer = non_empty(footer)
        .map(|path| utils::resolve_against(project_root, &path))
        .unwrap_or_else(|| template_dir.join("footer.html"));

    let template_config = TemplateDescriptor::load(&template_dir.join(TEMPLATE_CONFIG_FILE))?;

    // Whole-list override: the project's list replaces the template's outright.
    let extensions = match extensions {
        Some(list) => {
            debug!("Using project extensions {:?}", list);
            list
        }
        None => template_config.extensions.unwrap_or_default(),
    };

    Ok(Settings {
        project_root: project_root.to_path_buf(),
        install: layout.clone(),
        template,
        template_dir,
        title,
        source,
        output_root,
        header,
        footer,
        port,
        scripts: layout.script_sequence(&extensions),
        styles: layout.style_sequence(&extensions),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ABOUTME: Installation layout for the slidedown application
// ABOUTME: Resolves deck.js core files, named extensions, templates and bundle inputs

use crate::errors::{Result, SlidedownError};
use crate::utils;
use log::debug;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the installation root
pub const HOME_ENV: &str = "SLIDEDOWN_HOME";

/// Where the framework, its extensions and the templates live.
///
/// Extensions form a closed registry addressed by name: `status` always
/// resolves to `deck.js/extensions/status/deck.status.{js,css}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locate the installation from `SLIDEDOWN_HOME`, falling back to the
    /// parent of the directory holding the running executable.
    pub fn from_env() -> Result<Self> {
        if let Ok(home) = env::var(HOME_ENV) {
            debug!("Using {}={}", HOME_ENV, home);
            return Ok(Self::new(home));
        }

        let exe = env::current_exe().map_err(|e| {
            SlidedownError::ConfigError(format!("Cannot locate the slidedown executable: {}", e))
        })?;
        let root = exe
            .parent()
            .and_then(Path::parent)
            .ok_or_else(|| {
                SlidedownError::ConfigError(format!(
                    "Cannot derive an installation root from {:?}; set {}",
                    exe, HOME_ENV
                ))
            })?
            .to_path_buf();
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn deck_dir(&self) -> PathBuf {
        self.root.join("deck.js")
    }

    pub fn core_script(&self) -> PathBuf {
        self.deck_dir().join("core").join("deck.core.js")
    }

    pub fn core_style(&self) -> PathBuf {
        self.deck_dir().join("core").join("deck.core.css")
    }

    /// Script appended last to every script bundle; turns the rendered list into slides
    pub fn finalizer_script(&self) -> PathBuf {
        self.root.join("js").join("public_slidedown.js")
    }

    pub fn extension_script(&self, name: &str) -> PathBuf {
        self.deck_dir()
            .join("extensions")
            .join(name)
            .join(format!("deck.{}.js", name))
    }

    pub fn extension_style(&self, name: &str) -> PathBuf {
        self.deck_dir()
            .join("extensions")
            .join(name)
            .join(format!("deck.{}.css", name))
    }

    /// Feature-detection script copied once into the output
    pub fn modernizr(&self) -> PathBuf {
        self.deck_dir().join("modernizr.custom.js")
    }

    pub fn template_dir(&self, template: &str) -> PathBuf {
        self.root.join("template").join(template)
    }

    /// Script bundle inputs: core, each extension in order, finalizer
    pub fn script_sequence(&self, extensions: &[String]) -> Vec<PathBuf> {
        let mut scripts = vec![self.core_script()];
        scripts.extend(extensions.iter().map(|name| self.extension_script(name)));
        scripts.push(self.finalizer_script());
        scripts
    }

    /// Stylesheet bundle inputs: core, then each extension in order
    pub fn style_sequence(&self, extensions: &[String]) -> Vec<PathBuf> {
        let mut styles = vec![self.core_style()];
        styles.extend(extensions.iter().map(|name| self.extension_style(name)));
        styles
    }
}

/// Concatenate the current bytes of `files`, in order, with nothing in between.
/// Inputs are not decoded, so any encoding passes through untouched.
pub fn concat_files(files: &[PathBuf]) -> Result<Vec<u8>> {
    let mut bundle = Vec::new();
    for file in files {
        debug!("Reading bundle input: {:?}", file);
        bundle.extend_from_slice(&utils::read_bytes(file)?);
    }
    Ok(bundle)
}

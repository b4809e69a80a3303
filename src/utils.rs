// ABOUTME: Utility functions for the slidedown application
// ABOUTME: Provides file helpers for validation, output bootstrap and modification times

use crate::errors::{Result, SlidedownError};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| SlidedownError::write(path, e))?;
    } else if !path.is_dir() {
        return Err(SlidedownError::ValidationError(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory_exists(parent)?;
        }
    }
    Ok(())
}

/// Read a whole text file, attaching the path to any failure
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| SlidedownError::read(path, e))
}

/// Read a whole file as raw bytes, attaching the path to any failure
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| SlidedownError::read(path, e))
}

/// Write a whole file in one call, creating the parent directory if needed
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent_directory_exists(path)?;
    fs::write(path, content).map_err(|e| SlidedownError::write(path, e))
}

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Resolve `value` against `base` unless it is already absolute
pub fn resolve_against(base: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Create the output root and its `css/` and `js/` subdirectories
pub fn prepare_output_dirs(output_root: &Path) -> Result<()> {
    ensure_directory_exists(output_root)?;
    ensure_directory_exists(&output_root.join("css"))?;
    ensure_directory_exists(&output_root.join("js"))?;
    Ok(())
}

/// Copy `source` to `target` unless `target` already exists.
///
/// Returns whether a copy happened. Failures are logged and swallowed.
pub fn copy_if_absent(source: &Path, target: &Path) -> bool {
    if target.exists() {
        return false;
    }

    let copied = ensure_parent_directory_exists(target)
        .and_then(|_| fs::copy(source, target).map_err(|e| SlidedownError::read(source, e)));

    match copied {
        Ok(_) => {
            info!("Copied {:?} to {:?}", source, target);
            true
        }
        Err(e) => {
            warn!("Could not copy {:?}: {}", source, e);
            false
        }
    }
}

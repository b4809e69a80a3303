// ABOUTME: Error types for the slidedown application
// ABOUTME: Provides structured error handling for config, build, watch and serve stages

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlidedownError {
    #[error("Failed to read file {path:?}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {path:?}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Watch error: {0}")]
    WatchError(String),

    #[error("Server error: {0}")]
    ServerError(String),
}

impl SlidedownError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SlidedownError::FileReadError {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SlidedownError::FileWriteError {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SlidedownError>;

// ABOUTME: Library module for the slidedown program.
// ABOUTME: Contains config resolution, artifact assembly, file watching and static serving.

// Reexport modules
pub mod assembler;
pub mod config;
pub mod errors;
pub mod html;
pub mod resources;
pub mod server;
pub mod utils;
pub mod watch;

// Reexport common types and functions
pub use assembler::{ArtifactKind, Assembler, WorkingState};
pub use config::{resolve, resolve_with_layout, Settings};
pub use errors::{Result, SlidedownError};
pub use html::{ComrakRenderer, MarkdownRenderer};
pub use resources::InstallLayout;
pub use server::AssetServer;
pub use watch::{ChangeStream, TrackedFiles, TrackedRole, WatchBackend, WatchDispatcher};

/// Create the output directories and copy the feature-detection script if it is missing
pub fn bootstrap_output(settings: &Settings) -> Result<()> {
    utils::prepare_output_dirs(&settings.output_root)?;
    utils::copy_if_absent(
        &settings.install.modernizr(),
        &settings.output_root.join("js").join("modernizr.custom.js"),
    );
    Ok(())
}

#[cfg(test)]
mod tests;

// ABOUTME: Assembler module for the slidedown application
// ABOUTME: Owns the loaded header/footer/source text and regenerates the three output artifacts

use std::fmt;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::Settings;
use crate::errors::Result;
use crate::html::{self, ComrakRenderer, MarkdownRenderer};
use crate::resources;
use crate::utils;

/// One of the generated output files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Page,
    ScriptBundle,
    StyleBundle,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Page,
        ArtifactKind::StyleBundle,
        ArtifactKind::ScriptBundle,
    ];

    /// Path relative to the output root
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Page => "index.html",
            ArtifactKind::ScriptBundle => "js/script.js",
            ArtifactKind::StyleBundle => "css/style.css",
        }
    }

    pub fn output_path(self, output_root: &Path) -> PathBuf {
        output_root.join(self.file_name())
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Page => "page",
            ArtifactKind::ScriptBundle => "script bundle",
            ArtifactKind::StyleBundle => "style bundle",
        };
        f.write_str(name)
    }
}

/// Text the page is built from, each field refreshed only from its own file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingState {
    /// Header template with the title already substituted
    pub header: String,
    pub footer: String,
    pub source: String,
}

impl WorkingState {
    /// Read header, footer and source for the first build
    pub fn load(settings: &Settings) -> Result<Self> {
        let header = html::load_header(&settings.header, &settings.title)?;
        let footer = html::load_footer(&settings.footer)?;
        let source = utils::read_text(&settings.source)?;
        info!("Source loaded: {:?}", settings.source);
        Ok(Self {
            header,
            footer,
            source,
        })
    }
}

/// Regenerates output artifacts from the settings and the current working state
pub struct Assembler {
    settings: Settings,
    state: WorkingState,
    renderer: Box<dyn MarkdownRenderer>,
}

impl Assembler {
    /// Load the working state and render markdown with comrak
    pub fn new(settings: Settings) -> Result<Self> {
        Self::with_renderer(settings, ComrakRenderer)
    }

    pub fn with_renderer(
        settings: Settings,
        renderer: impl MarkdownRenderer + 'static,
    ) -> Result<Self> {
        let state = WorkingState::load(&settings)?;
        Ok(Self {
            settings,
            state,
            renderer: Box::new(renderer),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &WorkingState {
        &self.state
    }

    pub fn reload_header(&mut self) -> Result<()> {
        self.state.header = html::load_header(&self.settings.header, &self.settings.title)?;
        Ok(())
    }

    pub fn reload_footer(&mut self) -> Result<()> {
        self.state.footer = html::load_footer(&self.settings.footer)?;
        Ok(())
    }

    pub fn reload_source(&mut self) -> Result<()> {
        self.state.source = utils::read_text(&self.settings.source)?;
        info!("Source reloaded: {:?}", self.settings.source);
        Ok(())
    }

    /// Compute the full contents of one artifact
    pub fn build(&self, kind: ArtifactKind) -> Result<Vec<u8>> {
        match kind {
            ArtifactKind::Page => Ok(html::assemble_page(
                &self.state.header,
                &self.state.source,
                &self.state.footer,
                self.renderer.as_ref(),
            )
            .into_bytes()),
            ArtifactKind::ScriptBundle => resources::concat_files(&self.settings.scripts),
            ArtifactKind::StyleBundle => resources::concat_files(&self.settings.styles),
        }
    }

    /// Rebuild one artifact and overwrite its output file; returns the path written
    pub fn regenerate(&self, kind: ArtifactKind) -> Result<PathBuf> {
        let content = self.build(kind)?;
        let path = kind.output_path(&self.settings.output_root);
        utils::write_file(&path, &content)?;
        info!("{} written", kind.file_name());
        Ok(path)
    }

    /// Rebuild every artifact
    pub fn regenerate_all(&self) -> Result<()> {
        for kind in ArtifactKind::ALL {
            self.regenerate(kind)?;
        }
        Ok(())
    }
}

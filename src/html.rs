// ABOUTME: HTML generation module for the slidedown application
// ABOUTME: Renders markdown, loads header/footer templates and stitches the page together

use crate::errors::Result;
use crate::utils;
use comrak::{markdown_to_html, ComrakOptions};
use log::info;
use regex::{NoExpand, Regex};
use std::path::Path;
use std::sync::OnceLock;

/// Marker in the header template that is replaced with the presentation title
pub const TITLE_PLACEHOLDER: &str = "%=title=%";

/// Turns markdown text into an HTML fragment
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> String;
}

/// Markdown rendering backed by comrak, with raw HTML passed through
#[derive(Debug, Default, Clone, Copy)]
pub struct ComrakRenderer;

impl MarkdownRenderer for ComrakRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut options = ComrakOptions::default();
        options.render.unsafe_ = true; // Allow raw HTML
        markdown_to_html(markdown, &options)
    }
}

impl<F> MarkdownRenderer for F
where
    F: Fn(&str) -> String,
{
    fn render(&self, markdown: &str) -> String {
        self(markdown)
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!("(?i){}", regex::escape(TITLE_PLACEHOLDER)))
            .expect("title placeholder pattern is valid")
    })
}

/// Replace every occurrence of the title placeholder (any letter case) with `title`
pub fn substitute_title(header: &str, title: &str) -> String {
    placeholder_pattern()
        .replace_all(header, NoExpand(title))
        .into_owned()
}

/// Read the header template and fill in the title
pub fn load_header(path: &Path, title: &str) -> Result<String> {
    let header = substitute_title(&utils::read_text(path)?, title);
    info!("Header loaded: {:?}", path);
    Ok(header)
}

pub fn load_footer(path: &Path) -> Result<String> {
    let footer = utils::read_text(path)?;
    info!("Footer loaded: {:?}", path);
    Ok(footer)
}

/// Header, rendered body and footer joined as-is; template boundaries are not repaired
pub fn assemble_page(
    header: &str,
    source: &str,
    footer: &str,
    renderer: &dyn MarkdownRenderer,
) -> String {
    let body = renderer.render(source);
    let mut page = String::with_capacity(header.len() + body.len() + footer.len());
    page.push_str(header);
    page.push_str(&body);
    page.push_str(footer);
    page
}

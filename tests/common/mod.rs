// Shared fixture: a fake installation plus an empty project, both in one temp dir.
#![allow(dead_code)]

use slidedown::{InstallLayout, Settings};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tempfile::TempDir;

pub const HEADER: &str = "<html><head><title>%=title=%</title></head><body>\n";
pub const FOOTER: &str = "</body></html>\n";
pub const SOURCE: &str = "# First\n\nHello *deck*\n";

pub struct Fixture {
    pub dir: TempDir,
    pub install: PathBuf,
    pub project: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let install = dir.path().join("install");
        let project = dir.path().join("project");
        fs::create_dir_all(&project).expect("Failed to create project dir");

        write(&install.join("deck.js/core/deck.core.js"), "/* core js */\n");
        write(&install.join("deck.js/core/deck.core.css"), "/* core css */\n");
        for name in ["goto", "menu", "status"] {
            write(
                &install.join(format!("deck.js/extensions/{name}/deck.{name}.js")),
                &format!("/* {name} js */\n"),
            );
            write(
                &install.join(format!("deck.js/extensions/{name}/deck.{name}.css")),
                &format!("/* {name} css */\n"),
            );
        }
        write(&install.join("deck.js/modernizr.custom.js"), "/* modernizr */\n");
        write(&install.join("js/public_slidedown.js"), "/* finalizer */\n");
        write(
            &install.join("template/remies/config.json"),
            r#"{"extensions": ["goto", "menu"]}"#,
        );
        write(&install.join("template/remies/header.html"), HEADER);
        write(&install.join("template/remies/footer.html"), FOOTER);

        write(&project.join("slides.md"), SOURCE);

        Self {
            dir,
            install,
            project,
        }
    }

    pub fn layout(&self) -> InstallLayout {
        InstallLayout::new(&self.install)
    }

    pub fn write_project_config(&self, json: &str) {
        write(&self.project.join("slidedown.json"), json);
    }

    pub fn settings(&self) -> Settings {
        slidedown::resolve_with_layout(&self.project, &self.layout())
            .expect("Failed to resolve settings")
    }
}

pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent dir");
    fs::write(path, content).expect("Failed to write file");
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("Failed to read file")
}

/// Pin a file's modification time to `secs` after the epoch
pub fn set_mtime(path: &Path, secs: u64) {
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .expect("Failed to open file");
    file.set_modified(mtime(secs))
        .expect("Failed to set modification time");
}

pub fn mtime(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

/// Rewrite a file and give it a distinct modification time
pub fn edit(path: &Path, content: &str, secs: u64) {
    write(path, content);
    set_mtime(path, secs);
}

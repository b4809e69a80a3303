// ABOUTME: Watch module for monitoring tracked inputs and regenerating outputs
// ABOUTME: Maps each changed file to the artifact it feeds and rebuilds only that artifact

use log::{debug, error, info, warn};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, SystemTime};

use notify::{
    Config as NotifyConfig, Event, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher,
};

use crate::assembler::{ArtifactKind, Assembler};
use crate::config::Settings;
use crate::errors::{Result, SlidedownError};
use crate::utils;

/// Interval used when falling back to polling
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Why a file is being watched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedRole {
    Source,
    Header,
    Footer,
    Script,
    Style,
}

impl TrackedRole {
    /// The artifact that must be rebuilt when a file with this role changes
    pub fn kind(self) -> ArtifactKind {
        match self {
            TrackedRole::Source | TrackedRole::Header | TrackedRole::Footer => ArtifactKind::Page,
            TrackedRole::Script => ArtifactKind::ScriptBundle,
            TrackedRole::Style => ArtifactKind::StyleBundle,
        }
    }
}

/// Every input file named by the settings, paired with its role
pub fn tracked_files(settings: &Settings) -> Vec<(PathBuf, TrackedRole)> {
    let mut files = vec![
        (settings.source.clone(), TrackedRole::Source),
        (settings.header.clone(), TrackedRole::Header),
        (settings.footer.clone(), TrackedRole::Footer),
    ];
    files.extend(settings.scripts.iter().map(|p| (p.clone(), TrackedRole::Script)));
    files.extend(settings.styles.iter().map(|p| (p.clone(), TrackedRole::Style)));
    files
}

/// Normalize a path so event paths and configured paths compare equal.
/// Only the parent is canonicalized; the file itself may not exist yet.
fn tracking_key(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|dir| dir.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

/// Tracked files with their roles and last observed modification times
#[derive(Debug, Clone, Default)]
pub struct TrackedFiles {
    roles: HashMap<PathBuf, Vec<TrackedRole>>,
    last_seen: HashMap<PathBuf, Option<SystemTime>>,
}

impl TrackedFiles {
    /// Record the current modification time of every input named by `settings`.
    ///
    /// Capture this before the working state is loaded: an edit made after
    /// the capture then compares as a change.
    pub fn capture(settings: &Settings) -> Self {
        let mut tracked = Self::default();
        for (path, role) in tracked_files(settings) {
            let key = tracking_key(&path);
            tracked
                .last_seen
                .entry(key.clone())
                .or_insert_with(|| utils::get_mtime(&key));
            tracked.roles.entry(key).or_default().push(role);
        }
        debug!("Tracking {} files", tracked.roles.len());
        tracked
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.roles.contains_key(&tracking_key(path))
    }

    /// Directories that must be watched to see every tracked file
    pub fn watch_dirs(&self) -> Vec<PathBuf> {
        self.roles
            .keys()
            .filter_map(|key| key.parent().map(Path::to_path_buf))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Roles of `path` if it is tracked and its modification time moved
    /// since the last observation; the new time becomes the baseline
    fn observe(&mut self, path: &Path) -> Option<(PathBuf, Vec<TrackedRole>)> {
        let key = tracking_key(path);
        let roles = self.roles.get(&key)?.clone();

        let current = utils::get_mtime(&key);
        if self.last_seen.get(&key) == Some(&current) {
            debug!("Ignoring event for {:?}: modification time unchanged", key);
            return None;
        }
        self.last_seen.insert(key.clone(), current);
        Some((key, roles))
    }
}

/// Routes file changes to reloads and rebuilds.
///
/// Owns the assembler, so every mutation of the working state goes through
/// `handle_change` on a single thread.
pub struct WatchDispatcher {
    assembler: Assembler,
    tracked: TrackedFiles,
}

impl WatchDispatcher {
    /// Track the assembler's inputs starting from their current modification times
    pub fn new(assembler: Assembler) -> Self {
        let tracked = TrackedFiles::capture(assembler.settings());
        Self::with_tracked(assembler, tracked)
    }

    /// Track inputs against a baseline captured earlier
    pub fn with_tracked(assembler: Assembler, tracked: TrackedFiles) -> Self {
        Self { assembler, tracked }
    }

    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.tracked.is_tracked(path)
    }

    pub fn watch_dirs(&self) -> Vec<PathBuf> {
        self.tracked.watch_dirs()
    }

    /// React to a possible change of `path`.
    ///
    /// Untracked paths and tracked files whose modification time has not
    /// moved are ignored. Otherwise the matching working-state field is
    /// reloaded and the dependent artifact rebuilt, once per role.
    /// Returns the kinds that were rebuilt.
    pub fn handle_change(&mut self, path: &Path) -> Result<Vec<ArtifactKind>> {
        let Some((key, roles)) = self.tracked.observe(path) else {
            return Ok(Vec::new());
        };

        let mut rebuilt = Vec::with_capacity(roles.len());
        for role in roles {
            let kind = role.kind();
            info!("{:?} changed, rebuilding {}", key, kind);
            match role {
                TrackedRole::Source => self.assembler.reload_source()?,
                TrackedRole::Header => self.assembler.reload_header()?,
                TrackedRole::Footer => self.assembler.reload_footer()?,
                TrackedRole::Script | TrackedRole::Style => {}
            }
            self.assembler.regenerate(kind)?;
            rebuilt.push(kind);
        }
        Ok(rebuilt)
    }

    /// Consume change events until the source is exhausted.
    ///
    /// A failed reload or rebuild is logged and abandoned; the next event is
    /// handled normally.
    pub fn run(&mut self, events: impl IntoIterator<Item = PathBuf>) {
        for path in events {
            if let Err(e) = self.handle_change(&path) {
                error!("Rebuild after change to {:?} failed: {}", path, e);
            }
        }
    }
}

/// Which notification facility feeds a `ChangeStream`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchBackend {
    Native,
    Polling,
}

/// File-change paths from either the native watcher or the polling fallback
pub struct ChangeStream {
    _watcher: Box<dyn Watcher>,
    backend: WatchBackend,
    rx: Receiver<PathBuf>,
}

impl ChangeStream {
    /// Watch each directory in `dirs` (non-recursively)
    pub fn watch(dirs: &[PathBuf]) -> Result<Self> {
        let (tx, rx) = mpsc::channel();

        match RecommendedWatcher::new(forward_paths(tx.clone()), NotifyConfig::default()) {
            Ok(watcher) => {
                let mut watcher: Box<dyn Watcher> = Box::new(watcher);
                if register(watcher.as_mut(), dirs) > 0 || dirs.is_empty() {
                    info!("Watching {} directories for changes", dirs.len());
                    return Ok(Self {
                        _watcher: watcher,
                        backend: WatchBackend::Native,
                        rx,
                    });
                }
                warn!("Native file watching registered nothing; falling back to polling");
            }
            Err(e) => warn!("Native file watching unavailable ({}); falling back to polling", e),
        }

        let config = NotifyConfig::default().with_poll_interval(POLL_INTERVAL);
        let watcher = PollWatcher::new(forward_paths(tx), config).map_err(|e| {
            SlidedownError::WatchError(format!("Failed to create file watcher: {}", e))
        })?;
        let mut watcher: Box<dyn Watcher> = Box::new(watcher);
        register(watcher.as_mut(), dirs);
        info!(
            "Polling {} directories for changes every {:?}",
            dirs.len(),
            POLL_INTERVAL
        );

        Ok(Self {
            _watcher: watcher,
            backend: WatchBackend::Polling,
            rx,
        })
    }

    pub fn backend(&self) -> WatchBackend {
        self.backend
    }

    /// Blocking iterator over changed paths
    pub fn iter(&self) -> mpsc::Iter<'_, PathBuf> {
        self.rx.iter()
    }

    /// Next changed path, or `None` if nothing arrives within `timeout`
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PathBuf> {
        self.rx.recv_timeout(timeout).ok()
    }
}

fn forward_paths(tx: Sender<PathBuf>) -> impl FnMut(notify::Result<Event>) + Send + 'static {
    move |result: notify::Result<Event>| match result {
        Ok(event) if event.kind.is_access() => {}
        Ok(event) => {
            for path in event.paths {
                // Receiver gone means the dispatcher has stopped
                let _ = tx.send(path);
            }
        }
        Err(e) => error!("Watch error: {:?}", e),
    }
}

/// Register each directory, returning how many succeeded
fn register(watcher: &mut dyn Watcher, dirs: &[PathBuf]) -> usize {
    let mut registered = 0;
    for dir in dirs {
        match watcher.watch(dir, RecursiveMode::NonRecursive) {
            Ok(()) => {
                debug!("Watching {:?}", dir);
                registered += 1;
            }
            Err(e) => warn!("Cannot watch {:?}: {}", dir, e),
        }
    }
    registered
}

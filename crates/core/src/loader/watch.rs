use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::debug;

/// Events emitted by the data-directory watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataEvent {
    /// Dataset files were created, modified or removed.
    Changed(Vec<PathBuf>),
    /// The watcher reported an error.
    Error(String),
}

/// Watches a data directory and reports changed `.json` files.
///
/// Watching stops when the value is dropped.
pub struct DataWatcher {
    _watcher: RecommendedWatcher,
    dir: PathBuf,
}

impl DataWatcher {
    /// Start watching `dir`, sending events to `sender`.
    ///
    /// Events are dropped rather than queued when the receiver falls behind;
    /// a single pending change is enough to trigger a reload.
    pub fn spawn(dir: impl Into<PathBuf>, sender: mpsc::Sender<DataEvent>) -> notify::Result<Self> {
        let dir = dir.into();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => match dataset_changes(&event) {
                    Some(paths) => DataEvent::Changed(paths),
                    None => return,
                },
                Err(err) => DataEvent::Error(err.to_string()),
            };
            if let Err(err) = sender.try_send(event) {
                debug!(%err, "dropping data event");
            }
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        debug!(dir = %dir.display(), "watching data directory");
        Ok(Self {
            _watcher: watcher,
            dir,
        })
    }

    /// Directory being watched.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn dataset_changes(event: &Event) -> Option<Vec<PathBuf>> {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return None;
    }
    let paths: Vec<PathBuf> = event
        .paths
        .iter()
        .filter(|path| is_dataset_file(path))
        .cloned()
        .collect();
    if paths.is_empty() {
        None
    } else {
        Some(paths)
    }
}

fn is_dataset_file(path: &Path) -> bool {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return false;
    }
    // Editors write hidden swap files next to the real one.
    !path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

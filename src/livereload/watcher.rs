use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::UnboundedSender;
use tracing::error;

/// What happened to a watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Write,
    Create,
}

/// One filesystem change on a watched file.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

#[derive(Debug)]
pub enum WatchError {
    /// A watch root does not exist; dev mode must be run from the directory
    /// that actually holds the assets.
    MissingRoot(PathBuf),
    Io(PathBuf, io::Error),
    Notify(notify::Error),
}

impl std::fmt::Display for WatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchError::MissingRoot(p) => {
                write!(f, "watch root '{}' not found (run from the repository root)", p.display())
            }
            WatchError::Io(p, e) => write!(f, "cannot enumerate '{}': {}", p.display(), e),
            WatchError::Notify(e) => write!(f, "file watcher error: {}", e),
        }
    }
}

impl std::error::Error for WatchError {}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::Notify(e)
    }
}

/// Watch every file currently under `roots` and forward write/create events
/// into `events`.
///
/// The file set is fixed at startup; files added later are not picked up.
/// This blocks the calling thread until the event source closes or the
/// receiving side of `events` goes away; errors surfaced by the underlying
/// notification mechanism are logged and the loop keeps running. Only setup
/// failures (missing root, watcher construction) return an error.
pub fn watch_files(roots: &[PathBuf], events: UnboundedSender<ChangeEvent>) -> Result<(), WatchError> {
    let (tx, rx) = mpsc::channel::<notify::Result<notify::Event>>();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )?;

    for root in roots {
        if !root.exists() {
            return Err(WatchError::MissingRoot(root.clone()));
        }
        for file in collect_files(root)? {
            watcher.watch(&file, RecursiveMode::NonRecursive)?;
        }
    }

    for res in rx {
        match res {
            Ok(event) => {
                let kind = match event.kind {
                    EventKind::Modify(_) => ChangeKind::Write,
                    EventKind::Create(_) => ChangeKind::Create,
                    _ => continue,
                };
                for path in event.paths {
                    if events.send(ChangeEvent { path, kind }).is_err() {
                        // Coordinator gone, nothing left to notify.
                        return Ok(());
                    }
                }
            }
            Err(e) => error!("Watcher error: {}", e),
        }
    }

    Ok(())
}

/// Recursively enumerate the individual files under `dir`.
pub fn collect_files(dir: &Path) -> Result<Vec<PathBuf>, WatchError> {
    let mut files = Vec::new();
    let entries = fs::read_dir(dir).map_err(|e| WatchError::Io(dir.to_path_buf(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| WatchError::Io(dir.to_path_buf(), e))?;
        let path = entry.path();
        if path.is_dir() {
            files.extend(collect_files(&path)?);
        } else {
            files.push(path);
        }
    }
    Ok(files)
}

//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself, since editors
//! often save by writing a temp file and renaming it over the original.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::EngineConfig;

/// Sends each distinct, valid configuration written to one file.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<EngineConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of the update stream.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<EngineConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Dropping the returned handle stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path.file_name().map(|n| n.to_os_string());
        let last_sent: Mutex<Option<EngineConfig>> = Mutex::new(None);
        let reload_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Config watch error");
                        return;
                    }
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                if !touches(&event, file_name.as_deref()) {
                    return;
                }

                let next = match load_config(&reload_path) {
                    Ok(next) => next,
                    Err(e) => {
                        tracing::error!(
                            path = ?reload_path,
                            error = %e,
                            "Config reload rejected, keeping current settings"
                        );
                        return;
                    }
                };

                let mut last = last_sent.lock().unwrap_or_else(|e| e.into_inner());
                if last.as_ref() == Some(&next) {
                    return;
                }
                tracing::info!(path = ?reload_path, "Config file changed, applying");
                *last = Some(next.clone());
                let _ = update_tx.send(next);
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

/// Whether `event` concerns the file named `file_name`.
fn touches(event: &Event, file_name: Option<&std::ffi::OsStr>) -> bool {
    match file_name {
        Some(name) => event.paths.iter().any(|p| p.file_name() == Some(name)),
        None => true,
    }
}

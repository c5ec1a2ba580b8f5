//! Static file watcher feeding the reload broadcaster.

use std::path::{Path, PathBuf};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::reload::broadcaster::ReloadBroadcaster;

/// Change details forwarded to clients as the reload event payload.
#[derive(Debug, Clone, Serialize)]
struct ChangeNotice {
    kind: &'static str,
    paths: Vec<String>,
}

/// A watcher that monitors the static files directory for changes.
///
/// Every observed change broadcasts a `reload` event and then closes all
/// channels: a client that reloads opens a fresh subscription, so holding
/// the stale channels would only leak them. The coupling is deliberate.
pub struct ReloadWatcher {
    path: PathBuf,
    broadcaster: ReloadBroadcaster,
}

impl ReloadWatcher {
    pub fn new(path: &Path, broadcaster: ReloadBroadcaster) -> Self {
        Self {
            path: path.to_path_buf(),
            broadcaster,
        }
    }

    /// Start watching. The returned watcher must be kept alive for
    /// notifications to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (tx, mut rx) = mpsc::unbounded_channel::<ChangeNotice>();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let kind = if event.kind.is_create() {
                        "create"
                    } else if event.kind.is_modify() {
                        "modify"
                    } else if event.kind.is_remove() {
                        "remove"
                    } else {
                        return;
                    };

                    let notice = ChangeNotice {
                        kind,
                        paths: event
                            .paths
                            .iter()
                            .map(|p| p.to_string_lossy().into_owned())
                            .collect(),
                    };
                    let _ = tx.send(notice);
                }
                Err(e) => tracing::error!("watch error: {:?}", e),
            },
            Config::default(),
        )?;

        watcher.watch(&self.path, RecursiveMode::Recursive)?;

        let broadcaster = self.broadcaster;
        tokio::spawn(async move {
            while let Some(notice) = rx.recv().await {
                tracing::info!(
                    kind = %notice.kind,
                    paths = ?notice.paths,
                    "static files changed, notifying reload clients"
                );
                let payload = serde_json::to_string(&notice).unwrap_or_else(|_| "{}".to_string());
                broadcaster.send("reload", &payload);
                broadcaster.close_all();
            }
        });

        tracing::info!(path = ?self.path, "reload watcher started");
        Ok(watcher)
    }
}

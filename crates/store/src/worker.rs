//! Reconciliation loop: the single writer applying filesystem events.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::events::{is_wrap_file, translate, FsEvent};
use crate::{list_dir, Shared};

pub(crate) struct Reconciler {
    shared: Arc<Shared>,
    watcher: RecommendedWatcher,
    epoch_tx: watch::Sender<u64>,
}

impl Reconciler {
    pub(crate) fn new(shared: Arc<Shared>, watcher: RecommendedWatcher, epoch_tx: watch::Sender<u64>) -> Self {
        Self { shared, watcher, epoch_tx }
    }

    /// Drain notifications until every sender is gone. Each event is fully
    /// applied before the next one is looked at.
    pub(crate) async fn run(mut self, mut rx: mpsc::UnboundedReceiver<notify::Result<notify::Event>>) {
        while let Some(res) = rx.recv().await {
            let events = match res {
                Ok(ev) => translate(ev),
                Err(e) => vec![FsEvent::SubscriptionError(e.to_string())],
            };
            for ev in events {
                metrics::counter!("krapper_store_events_total", 1);
                self.apply(ev).await;
            }
        }
        info!("wrap store reconciler stopped");
    }

    async fn apply(&mut self, ev: FsEvent) {
        debug!(event = ?ev, "fs event");
        match ev {
            FsEvent::Created(path) => self.arrived(path).await,
            FsEvent::Modified(path) => {
                if !path.is_dir() {
                    self.reload(path).await;
                }
            }
            FsEvent::Removed(path) => self.evict(&path),
            FsEvent::Renamed { from, to } => {
                self.evict(&from);
                self.arrived(to).await;
            }
            FsEvent::SubscriptionError(msg) => error!(error = %msg, "filesystem notification error"),
        }
    }

    async fn arrived(&mut self, path: PathBuf) {
        if path.is_dir() {
            self.add_dir(path).await;
        } else {
            self.reload(path).await;
        }
    }

    /// Subscribe to a new directory tree, then pick up whatever was written
    /// into it before the subscription existed.
    async fn add_dir(&mut self, root: PathBuf) {
        let mut dirs = vec![root];
        while let Some(dir) = dirs.pop() {
            if let Err(e) = self.watcher.watch(&dir, RecursiveMode::NonRecursive) {
                error!(dir = %dir.display(), error = %e, "cannot watch new directory; its wraps will not be tracked");
                continue;
            }
            info!(dir = %dir.display(), "watching new directory");
            let listing = {
                let dir = dir.clone();
                tokio::task::spawn_blocking(move || list_dir(&dir)).await
            };
            match listing {
                Ok(Ok((subdirs, files))) => {
                    dirs.extend(subdirs);
                    for file in files {
                        self.reload(file).await;
                    }
                }
                Ok(Err(e)) => warn!(dir = %dir.display(), error = %e, "cannot list new directory"),
                Err(e) => error!(dir = %dir.display(), error = %e, "directory listing task failed"),
            }
        }
    }

    /// Load `path` outside the lock, then swap the result in. A failed load
    /// leaves whatever the file previously provided in place.
    async fn reload(&mut self, path: PathBuf) {
        if !is_wrap_file(&path) {
            return;
        }
        let loaded = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || krapper_schema::load(&path)).await
        };
        match loaded {
            Ok(Ok(Some(wrap))) => {
                info!(path = %path.display(), wrap = %wrap.name, version = %wrap.version, "wrap loaded");
                let mut index = self.shared.write();
                index.upsert(path, wrap);
                index.rebuild();
                let _ = self.epoch_tx.send(index.epoch());
            }
            Ok(Ok(None)) => debug!(path = %path.display(), "not a wrap document; ignored"),
            Ok(Err(e)) => {
                metrics::counter!("krapper_store_load_failures_total", 1);
                warn!(error = %e, "invalid wrap file; keeping previous state");
            }
            Err(e) => error!(path = %path.display(), error = %e, "wrap load task failed"),
        }
    }

    fn evict(&mut self, path: &Path) {
        let mut index = self.shared.write();
        let evicted = index.evict(path);
        if evicted.is_empty() {
            return;
        }
        info!(path = %path.display(), wraps = ?evicted, "wraps removed");
        index.rebuild();
        let _ = self.epoch_tx.send(index.epoch());
    }
}

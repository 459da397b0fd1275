//! Krapper store: the live catalog of every valid wrap under a directory.
//!
//! [`WrapStore::open`] sweeps the directory once, then hands a filesystem
//! watcher to a single background worker which is the only writer. Readers
//! share one `RwLock` and never wait on file I/O: documents are loaded before
//! the write lock is taken.

#![forbid(unsafe_code)]

mod events;
mod index;
mod worker;

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use krapper_schema::Wrap;
use notify::{RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use events::{is_wrap_file, translate, FsEvent};
pub use index::{Catalog, CatalogEntry, Index};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("listing {}: {source}", .path.display())]
    Walk { path: PathBuf, source: std::io::Error },
    #[error("watching {}: {source}", .path.display())]
    Watch { path: PathBuf, source: notify::Error },
    #[error("initial sweep aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub(crate) struct Shared {
    index: RwLock<Index>,
}

impl Shared {
    // Writers never panic while holding the lock, poisoning is not expected.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Index> { self.index.read().unwrap_or_else(|e| e.into_inner()) }
    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Index> { self.index.write().unwrap_or_else(|e| e.into_inner()) }
}

/// Handle on the live catalog. Cheap reads from any thread or task.
pub struct WrapStore {
    root: PathBuf,
    shared: Arc<Shared>,
    epoch_rx: watch::Receiver<u64>,
    worker: JoinHandle<()>,
}

impl WrapStore {
    /// Index every wrap under `root` and start watching it.
    ///
    /// Failing to subscribe to any directory aborts construction: an
    /// unwatched directory would silently drift from the catalog.
    /// Must be called from within a tokio runtime.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root: PathBuf = root.into();
        if !root.is_dir() {
            return Err(StoreError::NotADirectory(root));
        }
        // Notifications carry absolute paths; index under the same form.
        let root = std::fs::canonicalize(&root).map_err(|source| StoreError::Walk { path: root, source })?;
        info!(root = %root.display(), "wrap store initializing");

        let (tx, rx) = mpsc::unbounded_channel::<notify::Result<notify::Event>>();
        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = tx.send(res);
        })
        .map_err(|source| StoreError::Watch { path: root.clone(), source })?;

        let sweep_root = root.clone();
        let (index, watcher) = tokio::task::spawn_blocking(move || sweep(&sweep_root, watcher)).await??;

        let count = index.len();
        let (epoch_tx, epoch_rx) = watch::channel(index.epoch());
        let shared = Arc::new(Shared { index: RwLock::new(index) });
        let reconciler = worker::Reconciler::new(Arc::clone(&shared), watcher, epoch_tx);
        let worker = tokio::spawn(reconciler.run(rx));
        info!(root = %root.display(), wraps = count, "wrap store serving");
        Ok(Self { root, shared, epoch_rx, worker })
    }

    pub fn root(&self) -> &Path { &self.root }

    /// Current catalog projection.
    pub fn catalog(&self) -> Arc<Catalog> { self.shared.read().catalog() }

    pub fn wrap(&self, name: &str) -> Option<Arc<Wrap>> { self.shared.read().get(name) }

    pub fn len(&self) -> usize { self.shared.read().len() }
    pub fn is_empty(&self) -> bool { self.shared.read().is_empty() }

    /// Epoch bumped after every catalog rebuild.
    pub fn subscribe_epoch(&self) -> watch::Receiver<u64> { self.epoch_rx.clone() }
}

impl Drop for WrapStore {
    fn drop(&mut self) { self.worker.abort(); }
}

/// Subscribe to every directory under `root` and load every wrap file found.
/// Files that fail to load are logged and skipped.
fn sweep<W: Watcher>(root: &Path, mut watcher: W) -> Result<(Index, W), StoreError> {
    let mut index = Index::new();
    let mut dirs = vec![root.to_path_buf()];
    while let Some(dir) = dirs.pop() {
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| StoreError::Watch { path: dir.clone(), source })?;
        let (subdirs, files) = list_dir(&dir).map_err(|source| StoreError::Walk { path: dir.clone(), source })?;
        dirs.extend(subdirs);
        for file in files {
            match krapper_schema::load(&file) {
                Ok(Some(wrap)) => {
                    debug!(path = %file.display(), wrap = %wrap.name, "wrap loaded");
                    index.upsert(file, wrap);
                }
                Ok(None) => {}
                Err(e) => {
                    metrics::counter!("krapper_store_load_failures_total", 1);
                    warn!(error = %e, "skipping invalid wrap file");
                }
            }
        }
    }
    index.rebuild();
    Ok((index, watcher))
}

/// Split a directory's entries into subdirectories and wrap candidates.
pub(crate) fn list_dir(dir: &Path) -> std::io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut subdirs = Vec::new();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let ty = entry.file_type()?;
        if ty.is_dir() {
            subdirs.push(path);
        } else if is_wrap_file(&path) {
            files.push(path);
        }
    }
    subdirs.sort();
    files.sort();
    Ok((subdirs, files))
}

//! The in-memory wrap index and its catalog projection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use krapper_schema::{MenuMode, Wrap};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{info, warn};

/// Listing-oriented projection of every indexed wrap, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub wraps: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    pub label: String,
    pub menu_mode: MenuMode,
}

/// Per-file documents plus the name → (owning file, wrap) resolution. Every
/// mutation is followed by [`Index::rebuild`] before readers see the index again.
#[derive(Debug, Default)]
pub struct Index {
    wraps: FxHashMap<String, (PathBuf, Arc<Wrap>)>,
    files: FxHashMap<PathBuf, Arc<Wrap>>,
    catalog: Arc<Catalog>,
    epoch: u64,
}

impl Index {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.wraps.len() }
    pub fn is_empty(&self) -> bool { self.wraps.is_empty() }
    pub fn epoch(&self) -> u64 { self.epoch }
    pub fn catalog(&self) -> Arc<Catalog> { Arc::clone(&self.catalog) }
    pub fn get(&self, name: &str) -> Option<Arc<Wrap>> { self.wraps.get(name).map(|(_, w)| Arc::clone(w)) }
    pub fn name_for(&self, path: &Path) -> Option<&str> { self.files.get(path).map(|w| w.name.as_str()) }

    /// Insert `wrap` as the content of `path`. If the file used to declare
    /// another name, that name is released and returned.
    pub fn upsert(&mut self, path: PathBuf, wrap: Wrap) -> Option<String> {
        let wrap = Arc::new(wrap);
        let name = wrap.name.clone();
        if let Some(other) = self.files.iter().find(|(p, w)| w.name == name && **p != path).map(|(p, _)| p) {
            warn!(wrap = %name, path = %path.display(), other = %other.display(), "wrap name declared by several files; latest load wins");
        }
        let previous = self.files.insert(path.clone(), Arc::clone(&wrap));
        self.wraps.insert(name.clone(), (path.clone(), wrap));
        match previous {
            Some(old) if old.name != name => {
                self.release(&old.name, &path);
                info!(old = %old.name, new = %name, "wrap renamed in place");
                Some(old.name.clone())
            }
            _ => None,
        }
    }

    /// Forget `path` and every file below it. Returns the names no longer indexed.
    pub fn evict(&mut self, path: &Path) -> Vec<String> {
        let gone: Vec<PathBuf> = self.files.keys().filter(|p| p.starts_with(path)).cloned().collect();
        let mut evicted = Vec::new();
        for p in gone {
            if let Some(wrap) = self.files.remove(&p) {
                if self.release(&wrap.name, &p) {
                    evicted.push(wrap.name.clone());
                }
            }
        }
        evicted
    }

    // `from` no longer provides `name`. If it was the serving file, hand the
    // name to another file still declaring it, or drop it. True when dropped.
    fn release(&mut self, name: &str, from: &Path) -> bool {
        match self.wraps.get(name) {
            Some((owner, _)) if owner == from => {}
            _ => return false,
        }
        let heir = self
            .files
            .iter()
            .filter(|(_, w)| w.name == name)
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(p, w)| (p.clone(), Arc::clone(w)));
        match heir {
            Some((p, w)) => {
                info!(wrap = %name, path = %p.display(), "wrap now served from remaining file");
                self.wraps.insert(name.to_string(), (p, w));
                false
            }
            None => self.wraps.remove(name).is_some(),
        }
    }

    /// Recompute the catalog projection and bump the epoch.
    pub fn rebuild(&mut self) {
        let mut wraps: Vec<CatalogEntry> = self
            .wraps
            .values()
            .map(|(_, w)| CatalogEntry { name: w.name.clone(), label: w.label.clone(), menu_mode: w.menu_mode })
            .collect();
        wraps.sort_by(|a, b| a.name.cmp(&b.name));
        self.catalog = Arc::new(Catalog { wraps });
        self.epoch = self.epoch.saturating_add(1);
        metrics::gauge!("krapper_store_wraps", self.wraps.len() as f64);
    }
}

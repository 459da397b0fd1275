#![forbid(unsafe_code)]

use std::path::Path;
use std::time::{Duration, Instant};

use krapper_store::{StoreError, WrapStore};

fn doc(name: &str, version: &str, menu_mode: &str, kind: &str) -> String {
    format!(
        "apiVersion: krapper.kubotal.io/v1alpha1\nkind: Wrap\nname: {name}\nversion: {version}\nmenuMode: {menu_mode}\nsource:\n  apiVersion: v1\n  kind: {kind}\n"
    )
}

fn write(path: &Path, text: &str) { std::fs::write(path, text).unwrap(); }

/// Wait (bounded) until `cond` holds, waking on every catalog rebuild.
async fn eventually(store: &WrapStore, cond: impl Fn(&WrapStore) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut rx = store.subscribe_epoch();
    loop {
        if cond(store) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        let wait = (deadline - now).min(Duration::from_millis(200));
        let _ = tokio::time::timeout(wait, rx.changed()).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn catalog_follows_the_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("wrap1.yaml"), &doc("test-wrap-1", "v1", "grid", "Pod"));
    write(&root.join("notes.yaml"), "title: not a wrap\n");
    write(&root.join("broken.yaml"), &format!("{}bogus: true\n", doc("broken", "v1", "grid", "Pod")));

    let store = WrapStore::open(root).await.unwrap();
    let cat = store.catalog();
    assert_eq!(cat.wraps.len(), 1);
    assert_eq!(cat.wraps[0].name, "test-wrap-1");
    assert_eq!(cat.wraps[0].label, "Test wrap 1");
    assert_eq!(store.wrap("test-wrap-1").unwrap().version, "v1");

    // new file
    write(&root.join("wrap2.yaml"), &doc("test-wrap-2", "v1", "subMenu", "Service"));
    assert!(eventually(&store, |s| s.catalog().wraps.len() == 2).await);
    assert!(store.wrap("test-wrap-2").is_some());

    // update
    write(&root.join("wrap1.yaml"), &doc("test-wrap-1", "v2", "grid", "Pod"));
    assert!(eventually(&store, |s| s.wrap("test-wrap-1").map(|w| w.version == "v2").unwrap_or(false)).await);

    // removal
    std::fs::remove_file(root.join("wrap2.yaml")).unwrap();
    assert!(eventually(&store, |s| s.catalog().wraps.len() == 1).await);
    assert!(store.wrap("test-wrap-2").is_none());

    // directory created after startup, file written right away
    let sub = root.join("subdir");
    std::fs::create_dir(&sub).unwrap();
    write(&sub.join("wrap3.yaml"), &doc("test-wrap-3", "v1", "grid", "ConfigMap"));
    assert!(eventually(&store, |s| s.wrap("test-wrap-3").is_some()).await);
    assert_eq!(store.catalog().wraps.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn renaming_the_wrap_inside_its_file_evicts_the_old_name() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("w.yaml");
    write(&file, &doc("before", "v1", "grid", "Pod"));
    let store = WrapStore::open(dir.path()).await.unwrap();
    assert!(store.wrap("before").is_some());

    write(&file, &doc("after", "v1", "grid", "Pod"));
    assert!(eventually(&store, |s| s.wrap("after").is_some()).await);
    assert!(store.wrap("before").is_none());
    assert_eq!(store.catalog().wraps.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bad_edit_keeps_the_previous_document() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("w.yaml");
    write(&file, &doc("keeper", "v1", "grid", "Pod"));
    let store = WrapStore::open(dir.path()).await.unwrap();

    write(&file, &doc("keeper", "v2", "carousel", "Pod"));
    write(&dir.path().join("notes.yaml"), "kind: List\n");
    // events are applied in order: once the marker is in, the bad edit was seen
    write(&dir.path().join("marker.yaml"), &doc("marker", "v1", "grid", "Pod"));
    assert!(eventually(&store, |s| s.wrap("marker").is_some()).await);

    let kept = store.wrap("keeper").unwrap();
    assert_eq!(kept.version, "v1");
    assert_eq!(store.catalog().wraps.len(), 2);

    write(&file, &doc("keeper", "v3", "grid", "Pod"));
    assert!(eventually(&store, |s| s.wrap("keeper").map(|w| w.version == "v3").unwrap_or(false)).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn populated_directory_moved_in_is_indexed() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("wraps");
    let staging = dir.path().join("staging");
    std::fs::create_dir(&root).unwrap();
    std::fs::create_dir_all(staging.join("deeper")).unwrap();
    write(&staging.join("one.yaml"), &doc("moved-1", "v1", "grid", "Pod"));
    write(&staging.join("deeper").join("two.yml"), &doc("moved-2", "v1", "grid", "Secret"));

    let store = WrapStore::open(&root).await.unwrap();
    assert!(store.is_empty());

    std::fs::rename(&staging, root.join("team")).unwrap();
    assert!(eventually(&store, |s| s.wrap("moved-1").is_some() && s.wrap("moved-2").is_some()).await);

    // the moved tree is watched from now on
    std::fs::remove_file(root.join("team").join("deeper").join("two.yml")).unwrap();
    assert!(eventually(&store, |s| s.wrap("moved-2").is_none()).await);
    assert_eq!(store.catalog().wraps.len(), 1);
}

#[tokio::test]
async fn opening_a_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(matches!(WrapStore::open(&missing).await, Err(StoreError::NotADirectory(_))));
}

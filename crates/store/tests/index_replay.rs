#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use krapper_schema::{load_str, MenuMode, Wrap};
use krapper_store::Index;

fn wrap(name: &str, version: &str) -> Wrap {
    let yaml = format!(
        "apiVersion: krapper.kubotal.io/v1alpha1\nkind: Wrap\nname: {name}\nversion: {version}\nmenuMode: grid\nsource:\n  apiVersion: v1\n  kind: Pod\n"
    );
    load_str(&yaml, Path::new("fixture.yaml")).unwrap().unwrap()
}

fn p(s: &str) -> PathBuf { PathBuf::from(s) }

#[test]
fn replay_add_update_rename_remove() {
    let mut idx = Index::new();

    idx.upsert(p("/w/a.yaml"), wrap("alpha", "v1"));
    idx.upsert(p("/w/b.yaml"), wrap("beta", "v1"));
    idx.rebuild();
    let cat = idx.catalog();
    assert_eq!(cat.wraps.len(), 2);
    assert_eq!(cat.wraps[0].name, "alpha");
    assert_eq!(cat.wraps[0].label, "Alpha");
    assert_eq!(cat.wraps[0].menu_mode, MenuMode::Grid);
    assert_eq!(idx.epoch(), 1);

    // update in place
    assert_eq!(idx.upsert(p("/w/a.yaml"), wrap("alpha", "v2")), None);
    idx.rebuild();
    assert_eq!(idx.get("alpha").unwrap().version, "v2");

    // the file now declares another name
    assert_eq!(idx.upsert(p("/w/a.yaml"), wrap("gamma", "v1")), Some("alpha".to_string()));
    idx.rebuild();
    assert!(idx.get("alpha").is_none());
    assert!(idx.get("gamma").is_some());
    assert_eq!(idx.name_for(Path::new("/w/a.yaml")), Some("gamma"));

    assert_eq!(idx.evict(Path::new("/w/b.yaml")), vec!["beta".to_string()]);
    idx.rebuild();
    assert_eq!(idx.catalog().wraps.len(), 1);
    assert_eq!(idx.epoch(), 4);
}

#[test]
fn evicting_a_directory_drops_everything_below_it() {
    let mut idx = Index::new();
    idx.upsert(p("/w/sub/a.yaml"), wrap("a", "v1"));
    idx.upsert(p("/w/sub/deeper/b.yaml"), wrap("b", "v1"));
    idx.upsert(p("/w/c.yaml"), wrap("c", "v1"));
    let mut gone = idx.evict(Path::new("/w/sub"));
    gone.sort();
    assert_eq!(gone, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(idx.len(), 1);
    assert!(idx.evict(Path::new("/w/unknown.yaml")).is_empty());
}

#[test]
fn shared_name_survives_until_last_file_goes() {
    let mut idx = Index::new();
    idx.upsert(p("/w/one.yaml"), wrap("dup", "v1"));
    idx.upsert(p("/w/two.yaml"), wrap("dup", "v2"));
    assert!(idx.evict(Path::new("/w/one.yaml")).is_empty());
    assert!(idx.get("dup").is_some());
    assert_eq!(idx.evict(Path::new("/w/two.yaml")), vec!["dup".to_string()]);
    assert!(idx.is_empty());
}

#[test]
fn removing_the_serving_file_falls_back_to_the_other_declaration() {
    let mut idx = Index::new();
    idx.upsert(p("/w/one.yaml"), wrap("dup", "v1"));
    idx.upsert(p("/w/two.yaml"), wrap("dup", "v2"));
    assert_eq!(idx.get("dup").unwrap().version, "v2");

    assert!(idx.evict(Path::new("/w/two.yaml")).is_empty());
    idx.rebuild();
    assert_eq!(idx.get("dup").unwrap().version, "v1");
    assert_eq!(idx.catalog().wraps.len(), 1);

    // a rename away from the shared name also hands it over
    idx.upsert(p("/w/two.yaml"), wrap("dup", "v3"));
    assert_eq!(idx.upsert(p("/w/two.yaml"), wrap("solo", "v1")), Some("dup".to_string()));
    assert_eq!(idx.get("dup").unwrap().version, "v1");
}

//! Filesystem change events as seen by the reconciler.

use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind, RenameMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
    SubscriptionError(String),
}

/// Map one notification into reconciler events. Access events are dropped.
pub fn translate(event: notify::Event) -> Vec<FsEvent> {
    let notify::Event { kind, mut paths, .. } = event;
    match kind {
        EventKind::Access(_) => Vec::new(),
        EventKind::Create(_) => paths.into_iter().map(FsEvent::Created).collect(),
        EventKind::Remove(_) => paths.into_iter().map(FsEvent::Removed).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => paths.into_iter().map(FsEvent::Removed).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => paths.into_iter().map(FsEvent::Created).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() == 2 => {
            let to = paths.pop().unwrap_or_default();
            let from = paths.pop().unwrap_or_default();
            vec![FsEvent::Renamed { from, to }]
        }
        // Direction unknown: whatever still exists was renamed in.
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .into_iter()
            .map(|p| if p.exists() { FsEvent::Created(p) } else { FsEvent::Removed(p) })
            .collect(),
        EventKind::Modify(_) | EventKind::Any | EventKind::Other => paths.into_iter().map(FsEvent::Modified).collect(),
    }
}

/// Wrap documents are recognised by extension before any read happens.
pub fn is_wrap_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, RemoveKind};

    fn ev(kind: EventKind, paths: &[&str]) -> notify::Event {
        let mut e = notify::Event::new(kind);
        for p in paths {
            e = e.add_path(PathBuf::from(p));
        }
        e
    }

    #[test]
    fn translates_basic_kinds() {
        assert_eq!(translate(ev(EventKind::Create(CreateKind::File), &["/w/a.yaml"])), vec![FsEvent::Created("/w/a.yaml".into())]);
        assert_eq!(translate(ev(EventKind::Remove(RemoveKind::Any), &["/w/a.yaml"])), vec![FsEvent::Removed("/w/a.yaml".into())]);
        assert_eq!(
            translate(ev(EventKind::Modify(ModifyKind::Data(notify::event::DataChange::Content)), &["/w/a.yaml"])),
            vec![FsEvent::Modified("/w/a.yaml".into())]
        );
        assert!(translate(ev(EventKind::Access(notify::event::AccessKind::Any), &["/w/a.yaml"])).is_empty());
    }

    #[test]
    fn translates_renames() {
        assert_eq!(
            translate(ev(EventKind::Modify(ModifyKind::Name(RenameMode::Both)), &["/w/a.yaml", "/w/b.yaml"])),
            vec![FsEvent::Renamed { from: "/w/a.yaml".into(), to: "/w/b.yaml".into() }]
        );
        assert_eq!(
            translate(ev(EventKind::Modify(ModifyKind::Name(RenameMode::From)), &["/w/a.yaml"])),
            vec![FsEvent::Removed("/w/a.yaml".into())]
        );
        assert_eq!(
            translate(ev(EventKind::Modify(ModifyKind::Name(RenameMode::To)), &["/w/b.yaml"])),
            vec![FsEvent::Created("/w/b.yaml".into())]
        );
    }

    #[test]
    fn wrap_files_by_extension() {
        assert!(is_wrap_file(Path::new("/w/a.yaml")));
        assert!(is_wrap_file(Path::new("a.yml")));
        assert!(!is_wrap_file(Path::new("/w/a.json")));
        assert!(!is_wrap_file(Path::new("/w/yaml")));
    }
}

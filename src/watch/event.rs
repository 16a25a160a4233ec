// src/watch/event.rs

//! Conversion from `notify` events to [`ChangeEvent`]s.

use std::path::Path;

use notify::event::ModifyKind;
use notify::{Event, EventKind};

use crate::engine::{ChangeEvent, ChangeKind};

/// Map a raw notification kind onto a change kind.
///
/// Entries appearing, disappearing or being renamed are `Renamed`; content
/// and metadata updates are `Changed`. Pure accesses are not changes.
pub fn classify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Access(_) => None,
        EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)) => {
            Some(ChangeKind::Renamed)
        }
        _ => Some(ChangeKind::Changed),
    }
}

/// Name of the changed entry relative to `root`, with forward slashes.
///
/// - A direct `strip_prefix(root)` is tried first.
/// - If that fails (symlinks, `/private/var` on macOS), both paths are
///   canonicalized and stripped again.
/// - When `root` is itself the changed file, its file name is used.
/// - Otherwise the path is returned as-is.
pub fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).ok().map(Path::to_path_buf).or_else(|| {
        let root_canon = root.canonicalize().ok()?;
        let path_canon = path.canonicalize().ok()?;
        path_canon
            .strip_prefix(&root_canon)
            .ok()
            .map(Path::to_path_buf)
    });

    match relative {
        Some(rel) if rel.as_os_str().is_empty() => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.to_string_lossy().into_owned()),
        Some(rel) => rel.to_string_lossy().replace('\\', "/"),
        None => path.to_string_lossy().replace('\\', "/"),
    }
}

/// Translate one notification into zero or more change events, one per
/// affected path.
pub fn translate(root: &Path, event: &Event) -> Vec<ChangeEvent> {
    let Some(kind) = classify(&event.kind) else {
        return Vec::new();
    };

    if event.paths.is_empty() {
        return vec![ChangeEvent::new(kind, None)];
    }

    event
        .paths
        .iter()
        .map(|path| ChangeEvent::new(kind, Some(entry_name(root, path))))
        .collect()
}

//! File change events and the counters kept while applying them.

use std::collections::HashMap;
use std::path::PathBuf;

use notify::EventKind;

/// Types of file system changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    Created,
    Modified,
    Deleted,
}

impl ChangeType {
    /// Map a notify event kind; access and metadata-only events yield None.
    pub fn from_event_kind(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(ChangeType::Created),
            EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(ChangeType::Modified),
            EventKind::Remove(_) => Some(ChangeType::Deleted),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::Created => write!(f, "created"),
            ChangeType::Modified => write!(f, "modified"),
            ChangeType::Deleted => write!(f, "deleted"),
        }
    }
}

/// A file change event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub change_type: ChangeType,
}

impl FileChange {
    pub fn new(path: PathBuf, change_type: ChangeType) -> Self {
        Self { path, change_type }
    }

    pub fn created(path: PathBuf) -> Self {
        Self::new(path, ChangeType::Created)
    }

    pub fn modified(path: PathBuf) -> Self {
        Self::new(path, ChangeType::Modified)
    }

    pub fn deleted(path: PathBuf) -> Self {
        Self::new(path, ChangeType::Deleted)
    }
}

/// Keep only the last change per path, in path order.
pub fn dedupe(changes: Vec<FileChange>) -> Vec<FileChange> {
    let mut latest = HashMap::new();
    for change in changes {
        latest.insert(change.path.clone(), change);
    }
    let mut changes: Vec<FileChange> = latest.into_values().collect();
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    changes
}

/// Statistics from applying file changes to the index
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WatchStats {
    /// Files re-parsed and committed
    pub files_indexed: usize,
    pub files_removed: usize,
    pub files_failed: usize,
    /// Symbols committed by re-parsed files
    pub symbols_indexed: usize,
    /// Symbols dropped with removed files
    pub symbols_removed: usize,
    /// Changes the engine could not apply at all
    pub errors: usize,
}

impl WatchStats {
    pub fn merge(&mut self, other: &WatchStats) {
        self.files_indexed += other.files_indexed;
        self.files_removed += other.files_removed;
        self.files_failed += other.files_failed;
        self.symbols_indexed += other.symbols_indexed;
        self.symbols_removed += other.symbols_removed;
        self.errors += other.errors;
    }

    pub fn has_changes(&self) -> bool {
        self.files_indexed > 0 || self.files_removed > 0 || self.files_failed > 0
    }

    pub fn total_files(&self) -> usize {
        self.files_indexed + self.files_removed + self.files_failed
    }
}

use std::fmt;
use std::path::PathBuf;

/// Lifecycle state of the workspace indexer, published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexerStatus {
    Initializing,
    /// Importing is switched off in the configuration
    Disabled,
    Scanning,
    /// A single file is being re-indexed
    Updating(PathBuf),
    Ready,
    Error(String),
}

impl IndexerStatus {
    /// True once a scan has completed and queries reflect the workspace.
    pub fn is_ready(&self) -> bool {
        matches!(self, IndexerStatus::Ready | IndexerStatus::Updating(_))
    }
}

impl fmt::Display for IndexerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexerStatus::Initializing => write!(f, "initializing"),
            IndexerStatus::Disabled => write!(f, "disabled"),
            IndexerStatus::Scanning => write!(f, "scanning workspace"),
            IndexerStatus::Updating(path) => write!(f, "updating {}", path.display()),
            IndexerStatus::Ready => write!(f, "ready"),
            IndexerStatus::Error(message) => write!(f, "error: {}", message),
        }
    }
}

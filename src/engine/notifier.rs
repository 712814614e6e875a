use tracing::{error, info};

use crate::config::NotificationLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

impl NotificationKind {
    /// Whether a notification of this kind passes the configured level.
    pub fn allowed_by(self, level: NotificationLevel) -> bool {
        match self {
            NotificationKind::Info => level >= NotificationLevel::All,
            NotificationKind::Error => level >= NotificationLevel::Errors,
        }
    }
}

/// User-facing messages from the engine (scan summaries, failures).
///
/// Hosts supply their own implementation to surface these in a UI.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Info => info!("[tsimport] {}", message),
            NotificationKind::Error => error!("[tsimport] {}", message),
        }
    }
}

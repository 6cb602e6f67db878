//! Notification kind enumeration.

use serde::{Deserialize, Serialize};

/// Visual/semantic kind of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A completed action.
    Success,
    /// Something requiring attention.
    Warning,
    /// Informational only.
    Info,
    /// A pending task for the recipient.
    Task,
    /// A message-style notification.
    Mail,
}

impl NotificationKind {
    /// Return the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Task => "task",
            Self::Mail => "mail",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

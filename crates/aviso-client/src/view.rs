//! UI-facing notification view model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aviso_entity::notification::{Notification, NotificationKind, NotificationPriority};
use aviso_entity::role::CanonicalRole;

/// A notification as the client renders it.
///
/// Mirrors the persisted notification; `moved_to_history` is the client's
/// name for the read flag (read notifications leave the popup and live in
/// the history panel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientNotificationView {
    /// Notification identifier.
    pub id: Uuid,
    /// Notification kind.
    pub kind: NotificationKind,
    /// Rendered title.
    pub title: String,
    /// Rendered body text.
    pub message: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Whether the notification has been read.
    pub moved_to_history: bool,
    /// Destination role, `None` for broadcasts.
    pub destination_role: Option<CanonicalRole>,
    /// Route to open when clicked.
    pub suggested_route: Option<String>,
    /// Structured context data.
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Priority level.
    pub priority: NotificationPriority,
}

impl From<&Notification> for ClientNotificationView {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            title: n.title.clone(),
            message: n.message.clone(),
            created_at: n.created_at,
            moved_to_history: n.read,
            destination_role: n.destination_role,
            suggested_route: n.suggested_route.clone(),
            data: n.data.clone(),
            priority: n.priority,
        }
    }
}

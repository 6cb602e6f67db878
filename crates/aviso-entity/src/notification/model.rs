//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::CanonicalRole;

use super::kind::NotificationKind;
use super::priority::NotificationPriority;

/// A persisted notification delivered to viewers by role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// Notification kind.
    pub kind: NotificationKind,
    /// Rendered title.
    pub title: String,
    /// Rendered body text.
    pub message: String,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// Whether the recipient has read this notification. Monotonic:
    /// transitions false → true only.
    pub read: bool,
    /// Destination role. `None` is a broadcast visible to every viewer.
    pub destination_role: Option<CanonicalRole>,
    /// Route id the client should navigate to when opened.
    pub suggested_route: Option<String>,
    /// Additional structured data carried from the event payload.
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Priority level.
    pub priority: NotificationPriority,
}

impl Notification {
    /// Check if the notification has not been read yet.
    pub fn is_unread(&self) -> bool {
        !self.read
    }

    /// Whether a viewer with the given role sees this notification.
    ///
    /// Broadcasts (no destination role) are visible to everyone.
    pub fn visible_to(&self, role: CanonicalRole) -> bool {
        match self.destination_role {
            None => true,
            Some(dest) => dest == role || dest == CanonicalRole::Any,
        }
    }
}

/// The shape of a notification before persistence assigns identity.
///
/// Built by the delivery pipeline and handed to the notification store's
/// create operation; also the unit the deduplication filter compares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDraft {
    /// Notification kind.
    pub kind: NotificationKind,
    /// Rendered title.
    pub title: String,
    /// Rendered body text.
    pub message: String,
    /// Destination role. `None` is a broadcast.
    pub destination_role: Option<CanonicalRole>,
    /// Route id the client should navigate to when opened.
    pub suggested_route: Option<String>,
    /// Additional structured data carried from the event payload.
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Priority level.
    pub priority: NotificationPriority,
}

impl NotificationDraft {
    /// Materialize the draft as a persisted notification.
    pub fn into_notification(self) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            kind: self.kind,
            title: self.title,
            message: self.message,
            created_at: Utc::now(),
            read: false,
            destination_role: self.destination_role,
            suggested_route: self.suggested_route,
            data: self.data,
            priority: self.priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(dest: Option<CanonicalRole>) -> NotificationDraft {
        NotificationDraft {
            kind: NotificationKind::Info,
            title: "t".to_string(),
            message: "m".to_string(),
            destination_role: dest,
            suggested_route: None,
            data: serde_json::Map::new(),
            priority: NotificationPriority::Medium,
        }
    }

    #[test]
    fn test_visibility() {
        let broadcast = draft(None).into_notification();
        assert!(broadcast.visible_to(CanonicalRole::Admin));
        assert!(broadcast.visible_to(CanonicalRole::Pending));

        let targeted = draft(Some(CanonicalRole::Admin)).into_notification();
        assert!(targeted.visible_to(CanonicalRole::Admin));
        assert!(!targeted.visible_to(CanonicalRole::User));
    }

    #[test]
    fn test_draft_starts_unread() {
        let n = draft(None).into_notification();
        assert!(n.is_unread());
    }
}

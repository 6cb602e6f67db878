//! Content-based deduplication and the in-flight delivery registry.

use dashmap::DashSet;

use aviso_entity::notification::{Notification, NotificationDraft, NotificationKind};
use aviso_entity::role::CanonicalRole;

/// Content-derived identity of a notification.
///
/// The ordered tuple of (kind, title, message, route, destination role),
/// case-folded and trimmed. Deliberately ignores the trigger identity: two
/// rules rendering identical content produce one key and deduplicate
/// against each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey(String);

impl ContentKey {
    fn of_parts(
        kind: NotificationKind,
        title: &str,
        message: &str,
        route: Option<&str>,
        destination: Option<CanonicalRole>,
    ) -> Self {
        let parts = [
            kind.as_str(),
            &title.trim().to_lowercase(),
            &message.trim().to_lowercase(),
            &route.unwrap_or_default().trim().to_lowercase(),
            destination.map(|r| r.as_str()).unwrap_or(""),
        ];
        Self(parts.join("\u{1f}"))
    }

    /// Key of a delivery candidate.
    pub fn of_draft(draft: &NotificationDraft) -> Self {
        Self::of_parts(
            draft.kind,
            &draft.title,
            &draft.message,
            draft.suggested_route.as_deref(),
            draft.destination_role,
        )
    }

    /// Key of a persisted notification.
    pub fn of_notification(notification: &Notification) -> Self {
        Self::of_parts(
            notification.kind,
            &notification.title,
            &notification.message,
            notification.suggested_route.as_deref(),
            notification.destination_role,
        )
    }
}

/// Whether two destinations can reach the same viewer.
///
/// A broadcast shares its audience with everything.
fn shares_audience(a: Option<CanonicalRole>, b: Option<CanonicalRole>) -> bool {
    match (a, b) {
        (None, _) | (_, None) => true,
        (Some(a), Some(b)) => a == b,
    }
}

/// Whether the candidate is content-identical to a notification already
/// known for the same effective audience.
pub fn is_duplicate(candidate: &NotificationDraft, known: &[Notification]) -> bool {
    let key = ContentKey::of_draft(candidate);
    known
        .iter()
        .filter(|n| shares_audience(candidate.destination_role, n.destination_role))
        .any(|n| ContentKey::of_notification(n) == key)
}

/// Registry of delivery attempts currently in flight.
///
/// Serializes concurrent delivery attempts for equivalent content: the
/// first `begin` for a key wins, later ones are told to skip until the
/// winner calls `finish`.
#[derive(Debug, Default)]
pub struct InFlightRegistry {
    keys: DashSet<ContentKey>,
}

impl InFlightRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as in flight. Returns `false` if it already was.
    pub fn begin(&self, key: ContentKey) -> bool {
        self.keys.insert(key)
    }

    /// Clear a key after the attempt settles, success or not.
    pub fn finish(&self, key: &ContentKey) {
        self.keys.remove(key);
    }

    /// Whether a delivery for this key is currently in flight.
    pub fn contains(&self, key: &ContentKey) -> bool {
        self.keys.contains(key)
    }
}

//! Domain events consumed by the notification engine.
//!
//! Events are ephemeral: they are raised by application code, matched
//! against configured rules exactly once, and discarded. They are never
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ephemeral signal describing a domain action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID (logging/tracing only).
    pub id: Uuid,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
    /// The application section that raised the event (e.g. `"perfil"`).
    pub section: String,
    /// The action that happened within the section (e.g. `"registro_nuevo"`).
    pub action: String,
    /// The raw role of the actor, normalized at match time.
    pub origin_role: String,
    /// Structured payload describing the actor and context.
    pub payload: EventPayload,
}

/// Structured event payload.
///
/// A closed set of known optional fields consumed by the template renderer,
/// plus an open extension map carried through to the persisted
/// notification's `data` field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    /// Display name of the actor, if already known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Username of the actor, used to resolve a missing display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Raw role of the actor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Marks events raised by the system itself rather than a user action.
    #[serde(default)]
    pub system: bool,
    /// Open extension map for event-specific context.
    #[serde(default, flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Event {
    /// Create a new event.
    pub fn new(
        section: impl Into<String>,
        action: impl Into<String>,
        origin_role: impl Into<String>,
        payload: EventPayload,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            section: section.into(),
            action: action.into(),
            origin_role: origin_role.into(),
            payload,
        }
    }

    /// The `section:action` pair identifying what happened and where.
    pub fn match_key(&self) -> String {
        format!("{}:{}", self.section, self.action)
    }
}

impl EventPayload {
    /// Payload with only a username set.
    pub fn from_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_key() {
        let event = Event::new("perfil", "registro_nuevo", "any", EventPayload::default());
        assert_eq!(event.match_key(), "perfil:registro_nuevo");
    }

    #[test]
    fn test_payload_extra_roundtrip() {
        let json = serde_json::json!({
            "username": "ana",
            "documento": "abc-123"
        });
        let payload: EventPayload = serde_json::from_value(json).unwrap();
        assert_eq!(payload.username.as_deref(), Some("ana"));
        assert_eq!(
            payload.extra.get("documento").and_then(|v| v.as_str()),
            Some("abc-123")
        );
    }
}

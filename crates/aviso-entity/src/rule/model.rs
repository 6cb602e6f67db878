//! Rule entity model.
//!
//! Rules are created and edited by an external administrative workflow;
//! the engine only reads active rules.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::notification::{NotificationKind, NotificationPriority};
use crate::role::CanonicalRole;

/// Persisted configuration mapping a trigger identity and origin role to a
/// rendered notification and destination roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule identifier.
    pub id: Uuid,
    /// Whether the rule participates in matching.
    pub active: bool,
    /// Template for the notification title.
    pub title_template: String,
    /// Template for the notification body.
    pub message_template: String,
    /// Stable trigger identity (e.g. `"perfil_registro_nuevo"`).
    pub trigger_id: String,
    /// Kind of the produced notification.
    pub kind: NotificationKind,
    /// Priority of the produced notification.
    pub priority: NotificationPriority,
    /// Required origin role of the event actor; `Any` matches every origin.
    pub origin_role: CanonicalRole,
    /// `section:action` pair this rule listens for.
    pub match_key: String,
    /// Destination roles. Empty means broadcast.
    pub destination_roles: Vec<CanonicalRole>,
    /// Route the produced notification suggests opening.
    pub suggested_route: Option<String>,
}

impl Rule {
    /// Whether the rule carries everything matching and rendering need.
    ///
    /// Malformed rules are skipped during matching, never an error.
    pub fn is_well_formed(&self) -> bool {
        !self.trigger_id.trim().is_empty()
            && !self.match_key.trim().is_empty()
            && !(self.title_template.trim().is_empty() && self.message_template.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> Rule {
        Rule {
            id: Uuid::new_v4(),
            active: true,
            title_template: "Nuevo registro".to_string(),
            message_template: "{name} se ha registrado".to_string(),
            trigger_id: "perfil_registro_nuevo".to_string(),
            kind: NotificationKind::Info,
            priority: NotificationPriority::Medium,
            origin_role: CanonicalRole::Any,
            match_key: "perfil:registro_nuevo".to_string(),
            destination_roles: vec![CanonicalRole::Admin],
            suggested_route: None,
        }
    }

    #[test]
    fn test_well_formed() {
        assert!(rule().is_well_formed());
    }

    #[test]
    fn test_missing_trigger_is_malformed() {
        let mut r = rule();
        r.trigger_id = "  ".to_string();
        assert!(!r.is_well_formed());
    }

    #[test]
    fn test_missing_templates_is_malformed() {
        let mut r = rule();
        r.title_template.clear();
        r.message_template.clear();
        assert!(!r.is_well_formed());
    }
}

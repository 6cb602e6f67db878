//! Rule matching against incoming events.

use tracing::warn;

use aviso_core::events::Event;
use aviso_entity::role::{CanonicalRole, RoleTable};
use aviso_entity::rule::Rule;

/// An immutable snapshot of the configured rules.
///
/// Held by the event buffer as its configuration reference and swapped
/// wholesale on reload. Rules are kept sorted by id so match results are
/// deterministic for a fixed rule set.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build a snapshot from a rule list.
    pub fn new(mut rules: Vec<Rule>) -> Self {
        rules.sort_by_key(|r| r.id);
        Self { rules }
    }

    /// All rules in the snapshot, active or not.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules in the snapshot.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the snapshot holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Return the active, well-formed rules whose trigger and origin match
    /// the event.
    ///
    /// A rule matches when its key equals `section:action` or ends with
    /// `:action`, and its origin role is `Any`, equals the event's
    /// normalized origin, or the event's origin itself normalizes to `Any`.
    /// No match is a no-op, not an error.
    pub fn matching(&self, event: &Event, roles: &RoleTable) -> Vec<&Rule> {
        let event_key = event.match_key();
        let action_suffix = format!(":{}", event.action);
        let origin = roles.normalize(&event.origin_role);

        self.rules
            .iter()
            .filter(|rule| {
                if !rule.active {
                    return false;
                }
                if !rule.is_well_formed() {
                    warn!(rule_id = %rule.id, trigger = %rule.trigger_id, "Skipping malformed rule");
                    return false;
                }
                let key_matches =
                    rule.match_key == event_key || rule.match_key.ends_with(&action_suffix);
                let origin_matches = rule.origin_role == CanonicalRole::Any
                    || rule.origin_role == origin
                    || origin == CanonicalRole::Any;
                key_matches && origin_matches
            })
            .collect()
    }
}

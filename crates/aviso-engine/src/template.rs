//! Template rendering for notification titles and messages.

use aviso_core::events::Event;
use aviso_entity::role::RoleTable;

/// Values substituted into rule templates.
///
/// Missing values render as the empty string.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    /// Display name of the actor.
    pub name: String,
    /// Username of the actor.
    pub username: String,
    /// Canonical role of the actor.
    pub role: String,
}

impl TemplateVars {
    /// Build vars from an event payload, without name resolution.
    ///
    /// The delivery pipeline fills in a resolved display name afterwards
    /// when the payload lacks one.
    pub fn from_event(event: &Event, roles: &RoleTable) -> Self {
        let raw_role = event
            .payload
            .role
            .clone()
            .unwrap_or_else(|| event.origin_role.clone());
        Self {
            name: event.payload.name.clone().unwrap_or_default(),
            username: event.payload.username.clone().unwrap_or_default(),
            role: roles.normalize(&raw_role).to_string(),
        }
    }
}

/// Replace every occurrence of the `{name}`, `{username}`, and `{role}`
/// placeholders. Rendering cannot fail; an empty template is returned
/// unchanged.
pub fn render(template: &str, vars: &TemplateVars) -> String {
    if template.is_empty() {
        return template.to_string();
    }
    template
        .replace("{name}", &vars.name)
        .replace("{username}", &vars.username)
        .replace("{role}", &vars.role)
}

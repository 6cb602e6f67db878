//! Resolver capabilities provided by external collaborators.

use async_trait::async_trait;

use crate::result::AppResult;

/// Best-effort resolution of a user's display name by username.
///
/// Implementations return an empty string when the username is unknown;
/// a lookup miss is not an error.
#[async_trait]
pub trait DisplayNameResolver: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve the display name for a username.
    async fn resolve(&self, username: &str) -> AppResult<String>;
}

/// Route visibility resolution for suggested navigation targets.
///
/// Owned by the menu/sidebar subsystem; the engine only asks whether a
/// route id is visible for a role and what the fallback route is.
pub trait RouteResolver: Send + Sync + std::fmt::Debug + 'static {
    /// Whether the given route id is visible for the given canonical role.
    fn id_is_visible_for_role(&self, route_id: &str, role: &str) -> bool;

    /// The first route a viewer with the given role is allowed to open.
    fn first_allowed_route(&self, role: &str) -> Option<String>;
}

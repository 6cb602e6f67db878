//! Store traits for notifications and rules.
//!
//! Persistence is owned by external collaborators; the engine consumes it
//! through these object-safe traits.

use async_trait::async_trait;
use uuid::Uuid;

use aviso_core::result::AppResult;

use crate::notification::{Notification, NotificationDraft, NotificationKind, NotificationPriority};
use crate::role::CanonicalRole;
use crate::rule::Rule;

/// Server-side list filter for notifications.
#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    /// Restrict to notifications visible to this role (targeted to it or
    /// broadcast). `None` lists everything.
    pub role: Option<CanonicalRole>,
}

impl NotificationFilter {
    /// Filter for a single viewer role.
    pub fn for_role(role: CanonicalRole) -> Self {
        Self { role: Some(role) }
    }
}

/// External store of persisted notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a draft. Returns `None` when the store accepted the call but
    /// produced no record; the delivery pipeline treats that as a failed
    /// attempt.
    async fn create(&self, draft: &NotificationDraft) -> AppResult<Option<Notification>>;

    /// List notifications matching the filter.
    async fn list(&self, filter: &NotificationFilter) -> AppResult<Vec<Notification>>;

    /// Mark one notification as read. Returns `false` if it does not exist.
    async fn mark_read(&self, id: Uuid) -> AppResult<bool>;

    /// Mark every notification visible to the role as read.
    async fn mark_all_read(&self, role: CanonicalRole) -> AppResult<bool>;

    /// Delete a notification. Returns `false` if it does not exist.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Partial update applied to an existing rule.
#[derive(Debug, Clone, Default)]
pub struct RulePatch {
    /// New active flag.
    pub active: Option<bool>,
    /// New title template.
    pub title_template: Option<String>,
    /// New message template.
    pub message_template: Option<String>,
    /// New kind.
    pub kind: Option<NotificationKind>,
    /// New priority.
    pub priority: Option<NotificationPriority>,
    /// New origin role.
    pub origin_role: Option<CanonicalRole>,
    /// New destination roles.
    pub destination_roles: Option<Vec<CanonicalRole>>,
    /// New suggested route (`Some(None)` clears it).
    pub suggested_route: Option<Option<String>>,
}

/// External store of configured rules.
#[async_trait]
pub trait RuleStore: Send + Sync + std::fmt::Debug + 'static {
    /// List all rules, active or not.
    async fn list(&self) -> AppResult<Vec<Rule>>;

    /// Persist a new rule.
    async fn create(&self, rule: &Rule) -> AppResult<Rule>;

    /// Apply a patch to an existing rule. Returns `false` if it does not
    /// exist.
    async fn update(&self, id: Uuid, patch: &RulePatch) -> AppResult<bool>;

    /// Delete a rule. Returns `false` if it does not exist.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

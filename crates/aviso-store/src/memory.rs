//! In-memory collaborator implementations.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use aviso_core::error::AppError;
use aviso_core::result::AppResult;
use aviso_core::traits::kv::DurableStore;
use aviso_core::traits::resolver::{DisplayNameResolver, RouteResolver};
use aviso_entity::notification::{Notification, NotificationDraft};
use aviso_entity::role::CanonicalRole;
use aviso_entity::rule::Rule;
use aviso_entity::store::{NotificationFilter, NotificationStore, RulePatch, RuleStore};

/// In-memory notification store.
///
/// Preserves insertion order and supports create-failure injection so
/// retry behavior can be exercised deterministically.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    items: RwLock<Vec<Notification>>,
    /// Number of upcoming create calls that fail.
    failing_creates: AtomicUsize,
}

impl MemoryNotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` create calls fail with a store error.
    pub fn fail_next_creates(&self, n: usize) {
        self.failing_creates.store(n, Ordering::SeqCst);
    }

    /// Snapshot of every stored notification, in insertion order.
    pub fn all(&self) -> Vec<Notification> {
        self.items
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn take_failure(&self) -> bool {
        self.failing_creates
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, draft: &NotificationDraft) -> AppResult<Option<Notification>> {
        if self.take_failure() {
            return Err(AppError::store("Notification store unavailable"));
        }
        let notification = draft.clone().into_notification();
        self.items
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification.clone());
        Ok(Some(notification))
    }

    async fn list(&self, filter: &NotificationFilter) -> AppResult<Vec<Notification>> {
        let items = self.items.read().unwrap_or_else(|e| e.into_inner());
        Ok(match filter.role {
            Some(role) => items.iter().filter(|n| n.visible_to(role)).cloned().collect(),
            None => items.clone(),
        })
    }

    async fn mark_read(&self, id: Uuid) -> AppResult<bool> {
        let mut items = self.items.write().unwrap_or_else(|e| e.into_inner());
        match items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, role: CanonicalRole) -> AppResult<bool> {
        let mut items = self.items.write().unwrap_or_else(|e| e.into_inner());
        for n in items.iter_mut().filter(|n| n.visible_to(role)) {
            n.read = true;
        }
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut items = self.items.write().unwrap_or_else(|e| e.into_inner());
        let before = items.len();
        items.retain(|n| n.id != id);
        Ok(items.len() != before)
    }
}

/// In-memory rule store.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: RwLock<Vec<Rule>>,
}

impl MemoryRuleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with rules.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn list(&self) -> AppResult<Vec<Rule>> {
        Ok(self.rules.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn create(&self, rule: &Rule) -> AppResult<Rule> {
        self.rules
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(rule.clone());
        Ok(rule.clone())
    }

    async fn update(&self, id: Uuid, patch: &RulePatch) -> AppResult<bool> {
        let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());
        let Some(rule) = rules.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        if let Some(active) = patch.active {
            rule.active = active;
        }
        if let Some(title) = &patch.title_template {
            rule.title_template = title.clone();
        }
        if let Some(message) = &patch.message_template {
            rule.message_template = message.clone();
        }
        if let Some(kind) = patch.kind {
            rule.kind = kind;
        }
        if let Some(priority) = patch.priority {
            rule.priority = priority;
        }
        if let Some(origin) = patch.origin_role {
            rule.origin_role = origin;
        }
        if let Some(destinations) = &patch.destination_roles {
            rule.destination_roles = destinations.clone();
        }
        if let Some(route) = &patch.suggested_route {
            rule.suggested_route = route.clone();
        }
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());
        let before = rules.len();
        rules.retain(|r| r.id != id);
        Ok(rules.len() != before)
    }
}

/// In-memory durable key-value store.
#[derive(Debug, Default)]
pub struct MemoryDurableStore {
    entries: DashMap<String, serde_json::Value>,
}

impl MemoryDurableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStore for MemoryDurableStore {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.get(key).map(|v| v.clone())
    }

    fn set(&self, key: &str, value: serde_json::Value) {
        self.entries.insert(key.to_string(), value);
    }
}

/// Display-name resolver backed by a fixed map.
///
/// Unknown usernames resolve to the empty string, mirroring the
/// best-effort contract.
#[derive(Debug, Default)]
pub struct StaticDisplayNames {
    names: HashMap<String, String>,
}

impl StaticDisplayNames {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a username → display name mapping.
    pub fn with(mut self, username: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(username.into(), name.into());
        self
    }
}

#[async_trait]
impl DisplayNameResolver for StaticDisplayNames {
    async fn resolve(&self, username: &str) -> AppResult<String> {
        Ok(self.names.get(username).cloned().unwrap_or_default())
    }
}

/// Route resolver backed by explicit visibility rules.
///
/// Every route is visible by default; individual (route, role) pairs can
/// be hidden, and a per-role fallback route registered.
#[derive(Debug, Default)]
pub struct StaticRoutes {
    hidden: RwLock<HashSet<(String, String)>>,
    first: RwLock<HashMap<String, String>>,
}

impl StaticRoutes {
    /// Resolver where everything is visible.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Hide a route from a role.
    pub fn hide(&self, route_id: &str, role: &str) {
        self.hidden
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert((route_id.to_string(), role.to_string()));
    }

    /// Register the first allowed route for a role.
    pub fn set_first(&self, role: &str, route_id: &str) {
        self.first
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(role.to_string(), route_id.to_string());
    }
}

impl RouteResolver for StaticRoutes {
    fn id_is_visible_for_role(&self, route_id: &str, role: &str) -> bool {
        !self
            .hidden
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&(route_id.to_string(), role.to_string()))
    }

    fn first_allowed_route(&self, role: &str) -> Option<String> {
        self.first
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(role)
            .cloned()
    }
}

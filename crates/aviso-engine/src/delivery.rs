//! Delivery pipeline — turns a matched (rule, event) pair into a persisted
//! notification with deduplication and retry-with-backoff.

use std::sync::Arc;

use moka::future::Cache;
use tracing::{debug, warn};

use aviso_core::config::delivery::DeliveryConfig;
use aviso_core::events::Event;
use aviso_core::traits::{DisplayNameResolver, RouteResolver};
use aviso_entity::notification::NotificationDraft;
use aviso_entity::role::{CanonicalRole, RoleTable};
use aviso_entity::rule::Rule;
use aviso_entity::store::{NotificationFilter, NotificationStore};

use crate::dedup::{self, ContentKey, InFlightRegistry};
use crate::template::{self, TemplateVars};

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// A notification was persisted.
    Delivered,
    /// Equivalent content already exists or is being delivered; nothing to
    /// do. Not an error.
    Skipped,
    /// Persistence failed after all create attempts.
    Failed,
}

/// Persists matched rules as notifications.
///
/// All failures inside the pipeline are converted into a
/// [`DeliveryOutcome`]; nothing propagates as an error to callers.
#[derive(Debug)]
pub struct DeliveryPipeline {
    /// Notification persistence.
    store: Arc<dyn NotificationStore>,
    /// Display-name lookup for actors whose payload lacks a name.
    names: Arc<dyn DisplayNameResolver>,
    /// Route visibility resolution.
    routes: Arc<dyn RouteResolver>,
    /// Role alias table.
    roles: Arc<RoleTable>,
    /// Resolved display names, cached by username for the process lifetime.
    name_cache: Cache<String, String>,
    /// Content keys currently being delivered.
    in_flight: InFlightRegistry,
    /// Retry and backoff settings.
    config: DeliveryConfig,
}

impl DeliveryPipeline {
    /// Create a new pipeline.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        names: Arc<dyn DisplayNameResolver>,
        routes: Arc<dyn RouteResolver>,
        roles: Arc<RoleTable>,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            store,
            names,
            routes,
            roles,
            name_cache: Cache::builder().max_capacity(4096).build(),
            in_flight: InFlightRegistry::new(),
            config,
        }
    }

    /// Deliver one (rule, event, destination) candidate.
    ///
    /// Renders the templates, checks content deduplication against the
    /// store's current list for the audience, claims the in-flight key, and
    /// attempts persistence up to `create_attempts` times with a fixed
    /// delay between attempts.
    pub async fn deliver(
        &self,
        rule: &Rule,
        event: &Event,
        destination: Option<CanonicalRole>,
    ) -> DeliveryOutcome {
        let vars = self.template_vars(event).await;
        let draft = self.build_draft(rule, event, destination, &vars);

        let filter = NotificationFilter { role: destination };
        let known = match self.store.list(&filter).await {
            Ok(known) => known,
            Err(e) => {
                // Degrade to an empty known list: a resend is idempotent,
                // a dropped notification is not.
                warn!(error = %e, "Could not fetch known notifications for dedup");
                Vec::new()
            }
        };

        if dedup::is_duplicate(&draft, &known) {
            debug!(trigger = %rule.trigger_id, "Duplicate content, skipping delivery");
            return DeliveryOutcome::Skipped;
        }

        let key = ContentKey::of_draft(&draft);
        if !self.in_flight.begin(key.clone()) {
            debug!(trigger = %rule.trigger_id, "Delivery already in flight, skipping");
            return DeliveryOutcome::Skipped;
        }

        let outcome = self.try_create(&draft).await;
        self.in_flight.finish(&key);
        outcome
    }

    /// Deliver with an outer retry loop.
    ///
    /// Tolerates the store being temporarily unreachable by re-running the
    /// whole `deliver` (including dedup, so a concurrent success turns later
    /// attempts into skips). Returns `false` only after every attempt is
    /// exhausted; the event is then dropped.
    pub async fn deliver_with_retry(
        &self,
        rule: &Rule,
        event: &Event,
        destination: Option<CanonicalRole>,
    ) -> bool {
        let attempts = self.config.dispatch_attempts.max(1);
        for attempt in 1..=attempts {
            match self.deliver(rule, event, destination).await {
                DeliveryOutcome::Delivered | DeliveryOutcome::Skipped => return true,
                DeliveryOutcome::Failed => {
                    if attempt < attempts {
                        tokio::time::sleep(self.config.dispatch_retry_delay()).await;
                    }
                }
            }
        }
        warn!(
            trigger = %rule.trigger_id,
            event_id = %event.id,
            destination = destination.map(|r| r.as_str()).unwrap_or("broadcast"),
            "Dropping event after exhausting delivery attempts"
        );
        false
    }

    /// Bounded store-create loop.
    async fn try_create(&self, draft: &NotificationDraft) -> DeliveryOutcome {
        let attempts = self.config.create_attempts.max(1);
        for attempt in 1..=attempts {
            match self.store.create(draft).await {
                Ok(Some(notification)) => {
                    debug!(id = %notification.id, title = %notification.title, "Notification persisted");
                    return DeliveryOutcome::Delivered;
                }
                Ok(None) => {
                    warn!(attempt, "Notification store returned no record");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Notification create failed");
                }
            }
            if attempt < attempts {
                tokio::time::sleep(self.config.create_retry_delay()).await;
            }
        }
        DeliveryOutcome::Failed
    }

    /// Template variables for an event, resolving a missing display name.
    async fn template_vars(&self, event: &Event) -> TemplateVars {
        let mut vars = TemplateVars::from_event(event, &self.roles);
        if vars.name.is_empty() && !vars.username.is_empty() {
            vars.name = self.display_name(&vars.username).await;
        }
        vars
    }

    /// Resolve a display name, cached by username.
    async fn display_name(&self, username: &str) -> String {
        if let Some(hit) = self.name_cache.get(username).await {
            return hit;
        }
        match self.names.resolve(username).await {
            Ok(name) => {
                if !name.is_empty() {
                    self.name_cache
                        .insert(username.to_string(), name.clone())
                        .await;
                }
                name
            }
            Err(e) => {
                warn!(username, error = %e, "Display name resolution failed");
                String::new()
            }
        }
    }

    /// Suggested route for a destination, with visibility fallback.
    fn resolve_route(&self, rule: &Rule, destination: Option<CanonicalRole>) -> Option<String> {
        let route = rule.suggested_route.clone()?;
        match destination {
            None => Some(route),
            Some(role) => {
                if self.routes.id_is_visible_for_role(&route, role.as_str()) {
                    Some(route)
                } else {
                    self.routes.first_allowed_route(role.as_str())
                }
            }
        }
    }

    /// Build the candidate notification shape.
    fn build_draft(
        &self,
        rule: &Rule,
        event: &Event,
        destination: Option<CanonicalRole>,
        vars: &TemplateVars,
    ) -> NotificationDraft {
        let mut data = event.payload.extra.clone();
        if !vars.username.is_empty() {
            data.insert(
                "username".to_string(),
                serde_json::Value::String(vars.username.clone()),
            );
        }
        NotificationDraft {
            kind: rule.kind,
            title: template::render(&rule.title_template, vars),
            message: template::render(&rule.message_template, vars),
            destination_role: destination,
            suggested_route: self.resolve_route(rule, destination),
            data,
            priority: rule.priority,
        }
    }
}

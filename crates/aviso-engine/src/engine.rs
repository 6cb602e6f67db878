//! Engine facade — wires the event buffer, rule matching, and delivery
//! pipeline together behind the surface callers use.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use aviso_core::events::{Event, EventPayload};
use aviso_core::result::AppResult;
use aviso_entity::role::{CanonicalRole, RoleTable};
use aviso_entity::store::RuleStore;

use crate::buffer::{EventBuffer, ListenerId};
use crate::delivery::DeliveryPipeline;
use crate::matcher::RuleSet;

/// Role-targeted notification engine.
///
/// Events emitted before [`initialize`](Self::initialize) queue up in the
/// buffer; initialization loads the rule snapshot and replays the backlog
/// in FIFO order. Deliveries for one event run concurrently per
/// (rule × destination role) and never propagate errors to the emitter.
#[derive(Debug)]
pub struct NotificationEngine {
    buffer: EventBuffer,
    pipeline: Arc<DeliveryPipeline>,
    rule_store: Arc<dyn RuleStore>,
    roles: Arc<RoleTable>,
}

impl NotificationEngine {
    /// Create an engine in the Uninitialized state.
    pub fn new(
        rule_store: Arc<dyn RuleStore>,
        pipeline: Arc<DeliveryPipeline>,
        roles: Arc<RoleTable>,
    ) -> Self {
        Self {
            buffer: EventBuffer::new(),
            pipeline,
            rule_store,
            roles,
        }
    }

    /// Load rules, become Ready, and replay the buffered backlog in order.
    pub async fn initialize(&self) -> AppResult<()> {
        let rules = self.rule_store.list().await?;
        info!(rules = rules.len(), "Initializing notification engine");
        let backlog = self.buffer.initialize(Arc::new(RuleSet::new(rules)));
        if !backlog.is_empty() {
            debug!(events = backlog.len(), "Replaying buffered events");
        }
        for event in &backlog {
            self.dispatch(event).await;
        }
        Ok(())
    }

    /// Re-read the rule store and swap the held snapshot.
    ///
    /// Idempotent with respect to the buffer: already-drained events are
    /// not replayed.
    pub async fn reload_rules(&self) -> AppResult<()> {
        let rules = self.rule_store.list().await?;
        debug!(rules = rules.len(), "Reloading rule snapshot");
        self.buffer.initialize(Arc::new(RuleSet::new(rules)));
        Ok(())
    }

    /// Raise a domain event.
    ///
    /// Buffered while Uninitialized; matched and delivered immediately once
    /// Ready.
    pub async fn emit(
        &self,
        section: impl Into<String>,
        action: impl Into<String>,
        origin_role: impl Into<String>,
        payload: EventPayload,
    ) {
        let event = Event::new(section, action, origin_role, payload);
        if let Some(event) = self.buffer.push(event) {
            self.dispatch(&event).await;
        }
    }

    /// Match an event against the current snapshot and run deliveries.
    pub async fn dispatch(&self, event: &Event) {
        let Some(ruleset) = self.buffer.ruleset() else {
            return;
        };
        let matched: Vec<_> = ruleset
            .matching(event, &self.roles)
            .into_iter()
            .cloned()
            .collect();
        if matched.is_empty() {
            return;
        }

        let mut deliveries = Vec::new();
        for rule in &matched {
            let destinations: Vec<Option<CanonicalRole>> = if rule.destination_roles.is_empty() {
                vec![None]
            } else {
                rule.destination_roles.iter().copied().map(Some).collect()
            };
            for destination in destinations {
                deliveries.push(self.pipeline.deliver_with_retry(rule, event, destination));
            }
        }

        let results = join_all(deliveries).await;
        let dropped = results.iter().filter(|delivered| !**delivered).count();
        if dropped > 0 {
            warn!(event_id = %event.id, dropped, "Some deliveries were dropped");
        }
    }

    /// Register a listener for buffered and live events.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Event) -> AppResult<()> + Send + Sync + 'static,
    {
        self.buffer.subscribe(listener)
    }

    /// Remove a previously registered listener.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.buffer.unsubscribe(id)
    }

    /// Whether the engine has been initialized.
    pub fn is_ready(&self) -> bool {
        self.buffer.is_ready()
    }
}

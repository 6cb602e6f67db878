//! Shared test helpers for integration tests.

use std::sync::Arc;

use uuid::Uuid;

use aviso_client::NotificationCenter;
use aviso_core::config::AppConfig;
use aviso_core::events::EventPayload;
use aviso_engine::{DeliveryPipeline, NotificationEngine};
use aviso_entity::notification::{NotificationKind, NotificationPriority};
use aviso_entity::role::{CanonicalRole, RoleTable};
use aviso_entity::rule::Rule;
use aviso_store::memory::{
    MemoryDurableStore, MemoryNotificationStore, MemoryRuleStore, StaticDisplayNames, StaticRoutes,
};

/// Test application context
pub struct TestApp {
    /// The engine under test
    pub engine: NotificationEngine,
    /// Notification store shared by engine and client
    pub store: Arc<MemoryNotificationStore>,
    /// Durable key-value store shared by clients
    pub durable: Arc<MemoryDurableStore>,
    /// Route resolver, mutable from tests
    pub routes: Arc<StaticRoutes>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Wire an engine against fresh in-memory collaborators.
    pub fn new(rules: Vec<Rule>) -> Self {
        let config = AppConfig::default();
        let store = Arc::new(MemoryNotificationStore::new());
        let durable = Arc::new(MemoryDurableStore::new());
        let routes = Arc::new(StaticRoutes::allow_all());
        let roles = Arc::new(RoleTable::new());
        let names = Arc::new(StaticDisplayNames::new().with("ana", "Ana Pérez"));

        let pipeline = Arc::new(DeliveryPipeline::new(
            Arc::clone(&store) as _,
            names,
            Arc::clone(&routes) as _,
            Arc::clone(&roles),
            config.delivery.clone(),
        ));
        let engine = NotificationEngine::new(
            Arc::new(MemoryRuleStore::with_rules(rules)),
            pipeline,
            roles,
        );

        Self {
            engine,
            store,
            durable,
            routes,
            config,
        }
    }

    /// A rule notifying admins about new profile registrations.
    pub fn registration_rule() -> Rule {
        Rule {
            id: Uuid::new_v4(),
            active: true,
            title_template: "Nuevo registro".to_string(),
            message_template: "{name} ({username}) se ha registrado".to_string(),
            trigger_id: "perfil_registro_nuevo".to_string(),
            kind: NotificationKind::Info,
            priority: NotificationPriority::High,
            origin_role: CanonicalRole::Any,
            match_key: "perfil:registro_nuevo".to_string(),
            destination_roles: vec![CanonicalRole::Admin],
            suggested_route: Some("perfil".to_string()),
        }
    }

    /// Emit a profile-registration event for a username.
    pub async fn emit_registration(&self, username: &str) {
        self.engine
            .emit(
                "perfil",
                "registro_nuevo",
                "any",
                EventPayload::from_username(username),
            )
            .await;
    }

    /// Build a client center for a viewer role over the shared stores.
    pub fn center_for(&self, role: CanonicalRole) -> NotificationCenter {
        NotificationCenter::new(
            Arc::clone(&self.store) as _,
            Arc::clone(&self.durable) as _,
            role,
            self.config.client.clone(),
        )
    }
}

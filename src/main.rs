//! Aviso demo — wires the notification engine against in-memory
//! collaborators and walks a few events through the full pipeline.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};
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

#[tokio::main]
async fn main() {
    let env = std::env::var("AVISO_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Demo error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> aviso_core::result::AppResult<()> {
    tracing::info!("Starting Aviso demo v{}", env!("CARGO_PKG_VERSION"));

    let notification_store = Arc::new(MemoryNotificationStore::new());
    let durable = Arc::new(MemoryDurableStore::new());
    let names = Arc::new(StaticDisplayNames::new().with("ana", "Ana Pérez"));
    let routes = StaticRoutes::allow_all();
    routes.set_first("admin", "inicio");
    let roles = Arc::new(RoleTable::new());

    let rule_store = Arc::new(MemoryRuleStore::with_rules(vec![Rule {
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
    }]));

    let pipeline = Arc::new(DeliveryPipeline::new(
        Arc::clone(&notification_store) as _,
        names,
        Arc::new(routes),
        Arc::clone(&roles),
        config.delivery.clone(),
    ));
    let engine = NotificationEngine::new(rule_store, pipeline, roles);

    // Emitted before initialization: buffered, not lost.
    engine
        .emit(
            "perfil",
            "registro_nuevo",
            "any",
            EventPayload::from_username("ana"),
        )
        .await;
    tracing::info!("Event emitted while uninitialized (buffered)");

    engine.initialize().await?;
    tracing::info!("Engine initialized, backlog replayed");

    // Double submit of the same event: deduplicated, still one notification.
    engine
        .emit(
            "perfil",
            "registro_nuevo",
            "any",
            EventPayload::from_username("ana"),
        )
        .await;

    let center = NotificationCenter::new(
        notification_store,
        durable,
        CanonicalRole::Admin,
        config.client.clone(),
    );
    center.load().await;

    tracing::info!(unread = center.unread_count(), "Admin unread count");
    for view in center.unread_preview() {
        tracing::info!(title = %view.title, message = %view.message, "Preview entry");
    }

    if center.should_show_popup("demo-session-token") {
        center.show_popup();
        tracing::info!("Popup shown, dismissing it");
        center.dismiss_popup("demo-session-token");
    }

    tracing::info!("Aviso demo finished");
    Ok(())
}

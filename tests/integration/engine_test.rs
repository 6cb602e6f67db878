//! Engine scenarios: matching, targeting, buffering, deduplication.

use crate::helpers::TestApp;

use aviso_core::events::EventPayload;
use aviso_entity::role::CanonicalRole;

#[tokio::test(start_paused = true)]
async fn test_registration_notifies_admins_once() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);
    app.engine.initialize().await.unwrap();

    app.emit_registration("ana").await;

    let all = app.store.all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Nuevo registro");
    assert_eq!(all[0].message, "Ana Pérez (ana) se ha registrado");
    assert_eq!(all[0].destination_role, Some(CanonicalRole::Admin));
    assert_eq!(all[0].suggested_route.as_deref(), Some("perfil"));
}

#[tokio::test(start_paused = true)]
async fn test_double_submit_is_deduplicated() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);
    app.engine.initialize().await.unwrap();

    app.emit_registration("ana").await;
    app.emit_registration("ana").await;

    assert_eq!(app.store.all().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_distinct_actors_both_notified() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);
    app.engine.initialize().await.unwrap();

    app.emit_registration("ana").await;
    app.emit_registration("benito").await;

    assert_eq!(app.store.all().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_preinit_events_buffer_and_replay_in_order() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);

    app.emit_registration("ana").await;
    app.emit_registration("benito").await;
    assert!(app.store.all().is_empty());
    assert!(!app.engine.is_ready());

    app.engine.initialize().await.unwrap();

    let all = app.store.all();
    assert_eq!(all.len(), 2);
    assert!(all[0].message.contains("ana"));
    assert!(all[1].message.contains("benito"));
}

#[tokio::test(start_paused = true)]
async fn test_inactive_rule_is_ignored() {
    let mut rule = TestApp::registration_rule();
    rule.active = false;
    let app = TestApp::new(vec![rule]);
    app.engine.initialize().await.unwrap();

    app.emit_registration("ana").await;

    assert!(app.store.all().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_origin_role_filter_honors_aliases() {
    let mut rule = TestApp::registration_rule();
    rule.origin_role = CanonicalRole::Editor;
    let app = TestApp::new(vec![rule]);
    app.engine.initialize().await.unwrap();

    app.engine
        .emit(
            "perfil",
            "registro_nuevo",
            "user",
            EventPayload::from_username("ana"),
        )
        .await;
    assert!(app.store.all().is_empty());

    // "publisher" is an alias for the editor role.
    app.engine
        .emit(
            "perfil",
            "registro_nuevo",
            "publisher",
            EventPayload::from_username("ana"),
        )
        .await;
    assert_eq!(app.store.all().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hidden_route_falls_back_for_destination() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);
    app.routes.hide("perfil", "admin");
    app.routes.set_first("admin", "inicio");
    app.engine.initialize().await.unwrap();

    app.emit_registration("ana").await;

    let all = app.store.all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].suggested_route.as_deref(), Some("inicio"));
}

#[tokio::test(start_paused = true)]
async fn test_store_outage_is_retried_until_recovery() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);
    app.engine.initialize().await.unwrap();

    // Fail the whole first create loop; the dispatch retry recovers.
    app.store.fail_next_creates(3);
    app.emit_registration("ana").await;

    assert_eq!(app.store.all().len(), 1);
}

//! Client scenarios: the center over a live engine and shared stores.

use std::time::Duration;

use crate::helpers::TestApp;

use aviso_entity::role::CanonicalRole;
use uuid::Uuid;

#[tokio::test(start_paused = true)]
async fn test_admin_sees_registration_in_center() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);
    app.engine.initialize().await.unwrap();
    app.emit_registration("ana").await;

    let center = app.center_for(CanonicalRole::Admin);
    center.load().await;

    assert_eq!(center.unread_count(), 1);
    let preview = center.unread_preview();
    assert_eq!(preview.len(), 1);
    assert_eq!(preview[0].title, "Nuevo registro");
    assert!(!preview[0].moved_to_history);
}

#[tokio::test(start_paused = true)]
async fn test_other_roles_do_not_see_targeted_notification() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);
    app.engine.initialize().await.unwrap();
    app.emit_registration("ana").await;

    let center = app.center_for(CanonicalRole::User);
    center.load().await;

    assert_eq!(center.unread_count(), 0);
    assert!(center.views().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_mark_read_moves_to_history() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);
    app.engine.initialize().await.unwrap();
    app.emit_registration("ana").await;

    let center = app.center_for(CanonicalRole::Admin);
    center.load().await;
    let id = center.views()[0].id;

    assert!(center.mark_read(id).await);
    // Repeating is a no-op, not an error.
    assert!(center.mark_read(id).await);
    assert!(center.views()[0].moved_to_history);

    // Past the grace window the unread badge drops to zero.
    tokio::time::advance(Duration::from_secs(6)).await;
    assert_eq!(center.unread_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_mark_read_unknown_id_reports_false() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);
    let center = app.center_for(CanonicalRole::Admin);
    center.load().await;

    assert!(!center.mark_read(Uuid::new_v4()).await);
}

#[tokio::test(start_paused = true)]
async fn test_mark_all_read_clears_backlog() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);
    app.engine.initialize().await.unwrap();
    app.emit_registration("ana").await;
    app.emit_registration("benito").await;

    let center = app.center_for(CanonicalRole::Admin);
    center.load().await;
    assert_eq!(center.unread_count(), 2);

    assert!(center.mark_all_read().await);
    tokio::time::advance(Duration::from_secs(6)).await;
    assert_eq!(center.unread_count(), 0);
    assert_eq!(center.views().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_delete_removes_everywhere() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);
    app.engine.initialize().await.unwrap();
    app.emit_registration("ana").await;

    let center = app.center_for(CanonicalRole::Admin);
    center.load().await;
    let id = center.views()[0].id;

    assert!(center.delete(id).await);
    assert!(center.views().is_empty());
    assert!(app.store.all().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_popup_lifecycle_per_identity() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);
    app.engine.initialize().await.unwrap();
    app.emit_registration("ana").await;

    let center = app.center_for(CanonicalRole::Admin);
    center.load().await;

    assert!(center.should_show_popup("session-token-one"));
    center.show_popup();
    assert!(center.popup_visible());

    center.dismiss_popup("session-token-one");
    assert!(!center.popup_visible());
    assert!(!center.should_show_popup("session-token-one"));
    // A different session credential still sees it.
    assert!(center.should_show_popup("session-token-two"));
}

#[tokio::test(start_paused = true)]
async fn test_popup_reappears_for_newer_content() {
    let app = TestApp::new(vec![TestApp::registration_rule()]);
    app.engine.initialize().await.unwrap();
    app.emit_registration("ana").await;

    let center = app.center_for(CanonicalRole::Admin);
    center.load().await;
    center.dismiss_popup("session-token-one");
    assert!(!center.should_show_popup("session-token-one"));

    // New unread content created after the dismissal instant.
    tokio::time::advance(Duration::from_secs(2)).await;
    app.emit_registration("benito").await;
    center.refresh().await;

    assert!(center.should_show_popup("session-token-one"));
}

//! UI-facing facade bundling the cache and popup for one viewer.

use std::sync::Arc;

use uuid::Uuid;

use aviso_core::config::client::ClientConfig;
use aviso_core::traits::kv::DurableStore;
use aviso_entity::role::CanonicalRole;
use aviso_entity::store::NotificationStore;

use crate::cache::ClientCache;
use crate::popup::PopupTracker;
use crate::view::ClientNotificationView;

/// The read model a UI layer talks to for one authenticated viewer.
#[derive(Debug)]
pub struct NotificationCenter {
    cache: ClientCache,
    popup: PopupTracker,
    role: CanonicalRole,
}

impl NotificationCenter {
    /// Create a center for a viewer role.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        durable: Arc<dyn DurableStore>,
        role: CanonicalRole,
        config: ClientConfig,
    ) -> Self {
        let popup = PopupTracker::new(Arc::clone(&durable), config.popup_auto_hide());
        Self {
            cache: ClientCache::new(store, durable, config),
            popup,
            role,
        }
    }

    /// Initial load of the viewer's notifications.
    pub async fn load(&self) {
        self.cache.load(self.role).await;
    }

    /// Re-fetch the viewer's notifications.
    pub async fn refresh(&self) {
        self.cache.refresh(self.role).await;
    }

    /// Grace-smoothed unread count.
    pub fn unread_count(&self) -> usize {
        self.cache.unread_count(self.role)
    }

    /// Grace-smoothed preview of recent distinct unread notifications.
    pub fn unread_preview(&self) -> Vec<ClientNotificationView> {
        self.cache.unread_preview(self.role)
    }

    /// Every cached notification for the viewer.
    pub fn views(&self) -> Vec<ClientNotificationView> {
        self.cache.views(self.role)
    }

    /// Mark one notification as read.
    pub async fn mark_read(&self, id: Uuid) -> bool {
        self.cache.mark_read(id).await
    }

    /// Mark everything as read.
    pub async fn mark_all_read(&self) -> bool {
        self.cache.mark_all_read(self.role).await
    }

    /// Delete a notification.
    pub async fn delete(&self, id: Uuid) -> bool {
        self.cache.delete(id).await
    }

    /// Whether the popup should be shown for this session credential.
    pub fn should_show_popup(&self, token: &str) -> bool {
        self.popup
            .should_show(token, self.cache.latest_unread_at(self.role))
    }

    /// Show the popup and arm the auto-hide timer.
    pub fn show_popup(&self) {
        self.popup.show();
    }

    /// Dismiss the popup for this session credential.
    pub fn dismiss_popup(&self, token: &str) {
        self.popup.dismiss(token);
    }

    /// Whether the popup is currently visible.
    pub fn popup_visible(&self) -> bool {
        self.popup.is_visible()
    }
}

//! Client-side notification cache with durable fallback and grace-period
//! smoothing.

use std::sync::{Arc, Mutex};

use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use aviso_core::config::client::ClientConfig;
use aviso_core::traits::kv::DurableStore;
use aviso_engine::dedup::ContentKey;
use aviso_entity::notification::Notification;
use aviso_entity::role::CanonicalRole;
use aviso_entity::store::{NotificationFilter, NotificationStore};

use crate::view::ClientNotificationView;

#[derive(Debug, Default)]
struct CacheState {
    items: Vec<Notification>,
    /// Last non-zero unread count and when it was observed.
    last_nonzero_count: Option<(usize, Instant)>,
    /// Last non-empty preview and when it was observed.
    last_preview: Option<(Vec<Notification>, Instant)>,
}

/// Local mirror of the notifications visible to one viewer role.
///
/// The in-memory snapshot is fully replaced on every successful refresh and
/// mirrored into the durable store; a failed fetch serves the last durable
/// snapshot instead of an empty list. Unread counts and previews are
/// smoothed over a grace window so rapid refresh/mutation races never make
/// the badge flicker to zero.
#[derive(Debug)]
pub struct ClientCache {
    store: Arc<dyn NotificationStore>,
    durable: Arc<dyn DurableStore>,
    config: ClientConfig,
    state: Mutex<CacheState>,
}

impl ClientCache {
    /// Create an empty cache.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        durable: Arc<dyn DurableStore>,
        config: ClientConfig,
    ) -> Self {
        Self {
            store,
            durable,
            config,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn snapshot_key(role: CanonicalRole) -> String {
        format!("aviso:notifications:{role}")
    }

    /// Initial load for a viewer role. Same semantics as [`refresh`](Self::refresh).
    pub async fn load(&self, role: CanonicalRole) {
        self.refresh(role).await;
    }

    /// Fetch the current list for the role and replace the local snapshot.
    ///
    /// On fetch failure the last durable snapshot is served; if none exists
    /// the list stays empty. Never an error to the caller.
    pub async fn refresh(&self, role: CanonicalRole) {
        let filter = NotificationFilter::for_role(role);
        match self.store.list(&filter).await {
            Ok(items) => {
                let items: Vec<Notification> =
                    items.into_iter().filter(|n| n.visible_to(role)).collect();
                match serde_json::to_value(&items) {
                    Ok(value) => self.durable.set(&Self::snapshot_key(role), value),
                    Err(e) => warn!(error = %e, "Could not serialize notification snapshot"),
                }
                self.state.lock().unwrap_or_else(|e| e.into_inner()).items = items;
            }
            Err(e) => {
                warn!(role = %role, error = %e, "Refresh failed, serving durable snapshot");
                if let Some(value) = self.durable.get(&Self::snapshot_key(role)) {
                    match serde_json::from_value::<Vec<Notification>>(value) {
                        Ok(items) => {
                            self.state.lock().unwrap_or_else(|e| e.into_inner()).items = items;
                        }
                        Err(e) => warn!(error = %e, "Durable snapshot unreadable, keeping current"),
                    }
                }
            }
        }
    }

    /// Mark one notification as read, locally and in the store.
    ///
    /// Monotonic and idempotent: repeated calls are no-ops. Store failures
    /// are logged, never raised.
    pub async fn mark_read(&self, id: Uuid) -> bool {
        match self.store.mark_read(id).await {
            Ok(found) => {
                let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(n) = state.items.iter_mut().find(|n| n.id == id) {
                    n.read = true;
                }
                found
            }
            Err(e) => {
                warn!(%id, error = %e, "mark_read failed");
                false
            }
        }
    }

    /// Mark everything visible to the role as read.
    pub async fn mark_all_read(&self, role: CanonicalRole) -> bool {
        match self.store.mark_all_read(role).await {
            Ok(ok) => {
                let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                for n in state.items.iter_mut().filter(|n| n.visible_to(role)) {
                    n.read = true;
                }
                ok
            }
            Err(e) => {
                warn!(role = %role, error = %e, "mark_all_read failed");
                false
            }
        }
    }

    /// Delete a notification, locally and in the store.
    pub async fn delete(&self, id: Uuid) -> bool {
        match self.store.delete(id).await {
            Ok(found) => {
                let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                state.items.retain(|n| n.id != id);
                found
            }
            Err(e) => {
                warn!(%id, error = %e, "delete failed");
                false
            }
        }
    }

    /// Unread count for the role, grace-period smoothed.
    ///
    /// A freshly computed zero within the grace window of the last non-zero
    /// observation keeps reporting that previous value.
    pub fn unread_count(&self, role: CanonicalRole) -> usize {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let fresh = state
            .items
            .iter()
            .filter(|n| n.visible_to(role) && n.is_unread())
            .count();

        if fresh > 0 {
            state.last_nonzero_count = Some((fresh, now));
            return fresh;
        }
        match state.last_nonzero_count {
            Some((previous, seen_at)) if now.duration_since(seen_at) < self.config.grace_period() => {
                debug!(previous, "Unread count zero within grace window");
                previous
            }
            _ => 0,
        }
    }

    /// Up to `preview_limit` most-recent distinct unread notifications,
    /// grace-period smoothed like the count.
    pub fn unread_preview(&self, role: CanonicalRole) -> Vec<ClientNotificationView> {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let mut unread: Vec<Notification> = state
            .items
            .iter()
            .filter(|n| n.visible_to(role) && n.is_unread())
            .cloned()
            .collect();
        unread.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut seen = Vec::new();
        let mut fresh = Vec::new();
        for n in unread {
            let key = ContentKey::of_notification(&n);
            if !seen.contains(&key) {
                seen.push(key);
                fresh.push(n);
            }
            if fresh.len() == self.config.preview_limit {
                break;
            }
        }

        if !fresh.is_empty() {
            state.last_preview = Some((fresh.clone(), now));
            return fresh.iter().map(ClientNotificationView::from).collect();
        }
        match &state.last_preview {
            Some((previous, seen_at))
                if now.duration_since(*seen_at) < self.config.grace_period() =>
            {
                previous.iter().map(ClientNotificationView::from).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Every cached notification visible to the role.
    pub fn views(&self, role: CanonicalRole) -> Vec<ClientNotificationView> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .items
            .iter()
            .filter(|n| n.visible_to(role))
            .map(ClientNotificationView::from)
            .collect()
    }

    /// Creation time of the most recent unread notification, if any.
    pub fn latest_unread_at(&self, role: CanonicalRole) -> Option<chrono::DateTime<chrono::Utc>> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .items
            .iter()
            .filter(|n| n.visible_to(role) && n.is_unread())
            .map(|n| n.created_at)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aviso_entity::notification::{NotificationDraft, NotificationKind, NotificationPriority};
    use aviso_entity::store::NotificationStore;
    use aviso_store::memory::{MemoryDurableStore, MemoryNotificationStore};
    use std::time::Duration;

    fn draft(title: &str) -> NotificationDraft {
        NotificationDraft {
            kind: NotificationKind::Info,
            title: title.to_string(),
            message: "m".to_string(),
            destination_role: Some(CanonicalRole::Admin),
            suggested_route: None,
            data: serde_json::Map::new(),
            priority: NotificationPriority::Medium,
        }
    }

    fn cache(store: Arc<MemoryNotificationStore>) -> ClientCache {
        ClientCache::new(
            store,
            Arc::new(MemoryDurableStore::new()),
            ClientConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_unread_count_and_grace_window() {
        let store = Arc::new(MemoryNotificationStore::new());
        store.create(&draft("a")).await.unwrap();
        let cache = cache(Arc::clone(&store));

        cache.refresh(CanonicalRole::Admin).await;
        assert_eq!(cache.unread_count(CanonicalRole::Admin), 1);

        // Read server-side, then refresh: fresh count is 0 but the grace
        // window keeps reporting 1.
        store.mark_all_read(CanonicalRole::Admin).await.unwrap();
        cache.refresh(CanonicalRole::Admin).await;
        assert_eq!(cache.unread_count(CanonicalRole::Admin), 1);

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(cache.unread_count(CanonicalRole::Admin), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_count_recovers_within_grace() {
        let store = Arc::new(MemoryNotificationStore::new());
        store.create(&draft("a")).await.unwrap();
        let cache = cache(Arc::clone(&store));
        cache.refresh(CanonicalRole::Admin).await;
        assert_eq!(cache.unread_count(CanonicalRole::Admin), 1);

        store.mark_all_read(CanonicalRole::Admin).await.unwrap();
        store.create(&draft("b")).await.unwrap();
        store.create(&draft("c")).await.unwrap();
        cache.refresh(CanonicalRole::Admin).await;
        // Never visibly dropped to 0 in between; now reports the new value.
        assert_eq!(cache.unread_count(CanonicalRole::Admin), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_serves_durable_snapshot() {
        let store = Arc::new(MemoryNotificationStore::new());
        store.create(&draft("a")).await.unwrap();
        let durable = Arc::new(MemoryDurableStore::new());
        let cache = ClientCache::new(
            Arc::clone(&store) as Arc<dyn NotificationStore>,
            Arc::clone(&durable) as Arc<dyn DurableStore>,
            ClientConfig::default(),
        );

        cache.refresh(CanonicalRole::Admin).await;
        assert_eq!(cache.views(CanonicalRole::Admin).len(), 1);

        // A second cache instance with a failing store falls back to the
        // snapshot the first one persisted.
        let fallback = ClientCache::new(Arc::new(FailingStore), durable, ClientConfig::default());
        fallback.refresh(CanonicalRole::Admin).await;
        assert_eq!(fallback.views(CanonicalRole::Admin).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_snapshot_yields_empty_list() {
        let cache = ClientCache::new(
            Arc::new(FailingStore),
            Arc::new(MemoryDurableStore::new()),
            ClientConfig::default(),
        );
        cache.refresh(CanonicalRole::Admin).await;
        assert!(cache.views(CanonicalRole::Admin).is_empty());
        assert_eq!(cache.unread_count(CanonicalRole::Admin), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_read_idempotent() {
        let store = Arc::new(MemoryNotificationStore::new());
        store.create(&draft("a")).await.unwrap();
        let id = store.all()[0].id;
        let cache = cache(Arc::clone(&store));
        cache.refresh(CanonicalRole::Admin).await;

        assert!(cache.mark_read(id).await);
        assert!(store.all()[0].read);
        // Second call is a no-op, not an error.
        assert!(cache.mark_read(id).await);
        assert!(store.all()[0].read);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preview_distinct_and_limited() {
        let store = Arc::new(MemoryNotificationStore::new());
        for title in ["a", "a", "b", "c", "d"] {
            store.create(&draft(title)).await.unwrap();
        }
        let cache = cache(Arc::clone(&store));
        cache.refresh(CanonicalRole::Admin).await;

        let preview = cache.unread_preview(CanonicalRole::Admin);
        assert_eq!(preview.len(), 3);
        let titles: Vec<_> = preview.iter().map(|v| v.title.clone()).collect();
        // Distinct by content; the duplicate "a" collapses.
        assert_eq!(titles.iter().filter(|t| *t == "a").count(), 1);
    }

    /// Store whose every call fails.
    #[derive(Debug)]
    struct FailingStore;

    #[async_trait::async_trait]
    impl NotificationStore for FailingStore {
        async fn create(
            &self,
            _draft: &NotificationDraft,
        ) -> aviso_core::AppResult<Option<Notification>> {
            Err(aviso_core::AppError::store("down"))
        }

        async fn list(
            &self,
            _filter: &NotificationFilter,
        ) -> aviso_core::AppResult<Vec<Notification>> {
            Err(aviso_core::AppError::store("down"))
        }

        async fn mark_read(&self, _id: Uuid) -> aviso_core::AppResult<bool> {
            Err(aviso_core::AppError::store("down"))
        }

        async fn mark_all_read(&self, _role: CanonicalRole) -> aviso_core::AppResult<bool> {
            Err(aviso_core::AppError::store("down"))
        }

        async fn delete(&self, _id: Uuid) -> aviso_core::AppResult<bool> {
            Err(aviso_core::AppError::store("down"))
        }
    }
}

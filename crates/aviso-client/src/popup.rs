//! Popup visibility and per-identity dismissal tracking.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::debug;

use aviso_core::traits::kv::DurableStore;

#[derive(Debug, Default)]
struct PopupState {
    visible: bool,
    /// Bumped on every visibility toggle; stale auto-hide timers compare
    /// against it and do nothing.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Tracks whether the notification popup is shown, and remembers dismissal
/// per authenticated identity in the durable store.
///
/// Once dismissed for an identity the popup does not reappear until a new
/// credential is issued or an unread notification arrives after the
/// dismissal instant. An unacknowledged popup auto-hides after a fixed
/// delay.
#[derive(Debug)]
pub struct PopupTracker {
    durable: Arc<dyn DurableStore>,
    auto_hide: Duration,
    state: Arc<Mutex<PopupState>>,
}

impl PopupTracker {
    /// Create a hidden popup tracker.
    pub fn new(durable: Arc<dyn DurableStore>, auto_hide: Duration) -> Self {
        Self {
            durable,
            auto_hide,
            state: Arc::new(Mutex::new(PopupState::default())),
        }
    }

    /// Durable key for an identity's dismissal record.
    ///
    /// Uses a stable fragment of the session credential so a new login
    /// (new credential) starts fresh without persisting the token itself.
    fn dismissal_key(token: &str) -> String {
        let fragment: String = token.chars().rev().take(12).collect();
        format!("aviso:popup_dismissed:{fragment}")
    }

    /// Whether the popup should be shown for this identity.
    ///
    /// `latest_unread_at` is the creation time of the newest unread
    /// notification, if any; no unread means no popup.
    pub fn should_show(&self, token: &str, latest_unread_at: Option<DateTime<Utc>>) -> bool {
        let Some(latest) = latest_unread_at else {
            return false;
        };
        match self
            .durable
            .get(&Self::dismissal_key(token))
            .and_then(|v| serde_json::from_value::<DateTime<Utc>>(v).ok())
        {
            // Dismissed, but newer unread content arrived since.
            Some(dismissed_at) => latest > dismissed_at,
            None => true,
        }
    }

    /// Show the popup and arm the auto-hide timer.
    pub fn show(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.visible = true;
        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        let generation = state.generation;
        let shared = Arc::clone(&self.state);
        let delay = self.auto_hide;
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = shared.lock().unwrap_or_else(|e| e.into_inner());
            if state.generation == generation && state.visible {
                debug!("Popup auto-hidden");
                state.visible = false;
            }
        }));
    }

    /// Hide the popup without recording a dismissal.
    pub fn hide(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.visible = false;
        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }

    /// Dismiss the popup for this identity and persist the dismissal.
    pub fn dismiss(&self, token: &str) {
        if let Ok(value) = serde_json::to_value(Utc::now()) {
            self.durable.set(&Self::dismissal_key(token), value);
        }
        self.hide();
    }

    /// Whether the popup is currently visible.
    pub fn is_visible(&self) -> bool {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).visible
    }
}

impl Drop for PopupTracker {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }
}

//! Client cache and popup configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the client-side notification cache and popup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Window during which a previously observed non-zero unread count
    /// continues to be reported after dropping to zero, in milliseconds.
    #[serde(default = "default_grace_period")]
    pub grace_period_ms: u64,
    /// Time after which an unacknowledged popup closes itself, in
    /// milliseconds.
    #[serde(default = "default_popup_auto_hide")]
    pub popup_auto_hide_ms: u64,
    /// Maximum number of distinct unread notifications in the preview.
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
}

impl ClientConfig {
    /// Grace window for unread-count smoothing.
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    /// Popup auto-hide delay.
    pub fn popup_auto_hide(&self) -> Duration {
        Duration::from_millis(self.popup_auto_hide_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: default_grace_period(),
            popup_auto_hide_ms: default_popup_auto_hide(),
            preview_limit: default_preview_limit(),
        }
    }
}

fn default_grace_period() -> u64 {
    5000
}

fn default_popup_auto_hide() -> u64 {
    10_000
}

fn default_preview_limit() -> usize {
    3
}

//! Delivery pipeline configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry and backoff settings for the notification delivery pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Maximum store-create attempts per delivery.
    #[serde(default = "default_create_attempts")]
    pub create_attempts: u32,
    /// Delay between store-create attempts in milliseconds.
    #[serde(default = "default_create_retry_delay")]
    pub create_retry_delay_ms: u64,
    /// Maximum outer dispatch attempts per (rule, event, destination).
    #[serde(default = "default_dispatch_attempts")]
    pub dispatch_attempts: u32,
    /// Delay between outer dispatch attempts in milliseconds.
    #[serde(default = "default_dispatch_retry_delay")]
    pub dispatch_retry_delay_ms: u64,
}

impl DeliveryConfig {
    /// Delay between store-create attempts.
    pub fn create_retry_delay(&self) -> Duration {
        Duration::from_millis(self.create_retry_delay_ms)
    }

    /// Delay between outer dispatch attempts.
    pub fn dispatch_retry_delay(&self) -> Duration {
        Duration::from_millis(self.dispatch_retry_delay_ms)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            create_attempts: default_create_attempts(),
            create_retry_delay_ms: default_create_retry_delay(),
            dispatch_attempts: default_dispatch_attempts(),
            dispatch_retry_delay_ms: default_dispatch_retry_delay(),
        }
    }
}

fn default_create_attempts() -> u32 {
    3
}

fn default_create_retry_delay() -> u64 {
    400
}

fn default_dispatch_attempts() -> u32 {
    12
}

fn default_dispatch_retry_delay() -> u64 {
    1000
}

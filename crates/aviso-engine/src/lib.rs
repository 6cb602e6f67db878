//! # aviso-engine
//!
//! The event-to-notification pipeline: event buffering until configuration
//! is available, rule matching, template rendering, content deduplication,
//! and retry-with-backoff delivery into an external notification store.

pub mod buffer;
pub mod dedup;
pub mod delivery;
pub mod engine;
pub mod matcher;
pub mod template;

pub use buffer::{EventBuffer, ListenerId};
pub use dedup::{ContentKey, InFlightRegistry};
pub use delivery::{DeliveryOutcome, DeliveryPipeline};
pub use engine::NotificationEngine;
pub use matcher::RuleSet;

//! Durable local key-value storage.

use serde_json::Value;

/// A durable local key-value store (browser local storage, a file, or an
/// in-memory map in tests).
///
/// Used by the client cache for snapshot fallback and by the popup tracker
/// for per-identity dismissal state. Writes fully replace the stored value.
pub trait DurableStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Value);
}

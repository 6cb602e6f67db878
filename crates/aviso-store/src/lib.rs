//! # aviso-store
//!
//! In-memory implementations of the collaborator capabilities the engine
//! consumes. Single-node only: used by the demo binary, and by tests that
//! need deterministic stores with failure injection.

pub mod memory;

pub use memory::{
    MemoryDurableStore, MemoryNotificationStore, MemoryRuleStore, StaticDisplayNames, StaticRoutes,
};

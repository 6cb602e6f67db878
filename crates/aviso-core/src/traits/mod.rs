//! Abstract collaborator capabilities consumed by the engine.
//!
//! Entity-typed store traits (`NotificationStore`, `RuleStore`) live in
//! `aviso-entity` next to the models they persist; this module holds the
//! entity-free capabilities.

pub mod kv;
pub mod resolver;

pub use kv::DurableStore;
pub use resolver::{DisplayNameResolver, RouteResolver};

//! # aviso-entity
//!
//! Domain entity models and enums for Aviso: notifications, rules, the
//! canonical role vocabulary, and the store traits that persist them.

pub mod notification;
pub mod role;
pub mod rule;
pub mod store;

pub use notification::{Notification, NotificationDraft, NotificationKind, NotificationPriority};
pub use role::{CanonicalRole, RoleTable};
pub use rule::Rule;
pub use store::{NotificationFilter, NotificationStore, RulePatch, RuleStore};

//! Notification entity, kind, and priority.

pub mod kind;
pub mod model;
pub mod priority;

pub use kind::NotificationKind;
pub use model::{Notification, NotificationDraft};
pub use priority::NotificationPriority;

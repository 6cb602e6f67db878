//! # aviso-client
//!
//! The client-side view of the notification engine: a local cache with a
//! durable fallback snapshot, grace-period-smoothed unread counts and
//! previews, popup dismissal tracking per identity, and the
//! [`NotificationCenter`] facade a UI layer talks to.

pub mod cache;
pub mod center;
pub mod popup;
pub mod view;

pub use cache::ClientCache;
pub use center::NotificationCenter;
pub use popup::PopupTracker;
pub use view::ClientNotificationView;

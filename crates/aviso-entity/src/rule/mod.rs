//! Notification rule entity.

pub mod model;

pub use model::Rule;

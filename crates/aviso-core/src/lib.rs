//! # aviso-core
//!
//! Core crate for the Aviso notification engine. Contains collaborator
//! traits, configuration schemas, domain events, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other Aviso crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;

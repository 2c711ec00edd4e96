//! # warmup-core
//!
//! Core crate for the chip warmup backend. Contains the collaborator traits,
//! configuration schemas, typed identifiers, task events, pagination types,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other warmup crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;

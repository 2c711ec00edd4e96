//! # warmup-entity
//!
//! Domain entity models. Every struct in this crate represents a database
//! table row or a domain value object. Row types derive `sqlx::FromRow`.
//!
//! The task state machine lives on [`task::Task`] as pure transitions; the
//! lifecycle service decides when to call them and persists the outcome.

pub mod device;
pub mod task;

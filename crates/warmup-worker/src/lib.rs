//! Periodic reconciliation for the warmup backend.
//!
//! This crate provides:
//! - The [`SweepJob`] trait and a registry of sweeps by name
//! - Three built-in sweeps: stale running tasks, offline devices and
//!   retention purge
//! - A cron scheduler that runs the registered sweeps

pub mod jobs;
pub mod scheduler;
pub mod sweep;

pub use scheduler::CronScheduler;
pub use sweep::{SweepJob, SweepRegistry};

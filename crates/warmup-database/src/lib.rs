//! # warmup-database
//!
//! The persistence layer. [`store`] defines the `TaskStore` and
//! `DeviceStore` traits the services are written against;
//! [`repositories`] implements them on PostgreSQL and [`memory`] in
//! process. [`Persistence`] opens whichever backend the configuration
//! selects and closes it on shutdown.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod provider;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use provider::Persistence;
pub use store::{DeviceStore, RowVersion, TaskStore};

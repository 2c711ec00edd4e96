//! Collaborator traits defined in `warmup-core` and implemented by other crates.

pub mod publisher;
pub mod registry;

pub use publisher::{EventPublisher, NoopPublisher};
pub use registry::DeviceRegistry;

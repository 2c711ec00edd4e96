//! Task lifecycle.

pub mod input;
pub mod service;

pub use input::NewTask;
pub use service::TaskLifecycleManager;

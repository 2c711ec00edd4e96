//! Device registration and liveness.

pub mod service;

pub use service::DeviceService;

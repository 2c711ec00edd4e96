//! Device registry entities.

pub mod model;

pub use model::Device;

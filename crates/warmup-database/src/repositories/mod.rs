//! PostgreSQL implementations of the store traits.

pub mod device;
pub mod task;

pub use device::DeviceRepository;
pub use task::TaskRepository;

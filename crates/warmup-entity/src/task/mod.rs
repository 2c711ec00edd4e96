//! Task domain entities.

pub mod kind;
pub mod model;
pub mod query;
pub mod status;

pub use kind::TaskType;
pub use model::{CreateTask, FailOutcome, Task};
pub use query::{TaskFilter, TaskStats};
pub use status::{TaskPriority, TaskStatus};

//! Process-local store implementations backed by `DashMap`.
//!
//! Per-entry locking gives conditional writes the same all-or-nothing
//! behaviour the PostgreSQL `UPDATE ... WHERE` has. Contents are lost
//! when the process exits.

pub mod device;
pub mod task;

pub use device::MemoryDeviceStore;
pub use task::MemoryTaskStore;

use warmup_core::types::pagination::{PageRequest, PageResponse};

/// Slice one page out of an already ordered list.
fn paginate<T>(items: Vec<T>, page: &PageRequest) -> PageResponse<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    PageResponse::new(items, page, total)
}

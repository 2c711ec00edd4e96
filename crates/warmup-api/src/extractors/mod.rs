//! Request extractors and query helpers.

pub mod pagination;

pub use pagination::PaginationParams;

pub mod pagination;

pub use pagination::{PaginationMetadata, PaginationParams};

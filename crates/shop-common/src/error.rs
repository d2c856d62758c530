//! Error types shared across Shoplens crates

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, ShopError>;

/// Main error type for shared operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

//! Shoplens Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging and error handling for the Shoplens workspace.
//!
//! # Overview
//!
//! This crate is used by both the ingestion CLI and the reporting server:
//!
//! - **Error Handling**: common error and result types
//! - **Logging**: tracing subscriber bootstrap driven by `LOG_*` variables
//! - **Types**: entity kinds and the order lifecycle vocabulary
//!
//! # Example
//!
//! ```no_run
//! use shop_common::logging::{init_logging, LogConfig};
//! use shop_common::types::EntityKind;
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::from_env()?)?;
//!     for kind in EntityKind::LOAD_ORDER {
//!         tracing::info!(entity = %kind, "known entity");
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, ShopError};
pub use types::{EntityKind, OrderStatus};

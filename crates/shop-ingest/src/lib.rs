//! Shoplens Ingest Library
//!
//! Bulk loader for the e-commerce CSV exports. Sources are loaded in
//! foreign-key order, one row and one insert at a time:
//!
//! - **decoder**: delimited text to rows of named cells
//! - **schema**: per-entity coercion and validation
//! - **loader**: one generic loader for every schema
//! - **orchestrator**: fixed load order, first failure stops the run
//! - **store**: Postgres and in-memory persistence
//!
//! # Example
//!
//! ```no_run
//! use shop_ingest::{IngestOrchestrator, MemoryStore, SourceConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let orchestrator = IngestOrchestrator::new(SourceConfig::new("./data"), Arc::new(MemoryStore::new()));
//!     let report = orchestrator.run().await?;
//!     report.log_summary();
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod coerce;
pub mod config;
pub mod decoder;
pub mod error;
pub mod loader;
pub mod orchestrator;
pub mod schema;
pub mod store;

pub use config::{IngestConfig, SourceConfig};
pub use error::{DecodeError, IngestError, LoadError, StoreError, ValidationError};
pub use loader::{EntityLoader, LoadStats};
pub use orchestrator::{IngestOrchestrator, IngestReport};
pub use store::{CreateOutcome, MemoryStore, PgStore, Store};

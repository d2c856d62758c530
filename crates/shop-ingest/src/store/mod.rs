//! Persistence boundary for the loaders
//!
//! The pipeline only ever creates rows. A store answers each create with the
//! assigned id, a tolerated conflict, or a fatal [`StoreError`].

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{DatabaseConfig, PgStore};

use async_trait::async_trait;
use shop_common::EntityKind;

use crate::error::StoreError;
use crate::schema::Entity;

/// Unique constraint whose violation is tolerated as a conflict
pub const USER_EMAIL_CONSTRAINT: &str = "users_email_key";

/// Result of a single create
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created { id: i32 },
    /// Row skipped; carries the entity's natural key
    Conflict { key: String },
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert `entity`, using its source id when it has one
    async fn create_if_absent(&self, entity: &Entity) -> Result<CreateOutcome, StoreError>;

    /// Called once a kind has been fully loaded; returns its persisted count
    async fn complete(&self, kind: EntityKind) -> Result<u64, StoreError>;

    /// Release connections. Later creates fail with [`StoreError::Closed`].
    async fn close(&self);
}

fn primary_key_constraint(kind: EntityKind) -> String {
    format!("{}_pkey", kind.table_name())
}

fn foreign_key_constraint(kind: EntityKind, column: &str) -> String {
    format!("{}_{}_fkey", kind.table_name(), column)
}

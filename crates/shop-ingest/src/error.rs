//! Error taxonomy for the ingestion pipeline
//!
//! Each layer has its own enum. [`LoadError`] is the row-level union the
//! loader deals in, and [`IngestError`] is the single terminal failure the
//! orchestrator hands back to the caller.

use shop_common::{EntityKind, OrderStatus};
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read the delimited source itself
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Wrong column count, invalid UTF-8 or an I/O failure mid-stream
    #[error("malformed record at row {row}: {source}")]
    Malformed {
        row: u64,
        #[source]
        source: csv::Error,
    },

    /// Header lacks columns the entity needs
    #[error("header is missing column(s): {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
}

impl DecodeError {
    /// Ordinal of the offending row; the header is row 0
    pub fn row(&self) -> u64 {
        match self {
            DecodeError::Malformed { row, .. } => *row,
            DecodeError::MissingColumns { .. } => 0,
        }
    }
}

/// A decoded row that cannot become an entity
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing value for required field '{field}'")]
    MissingField { field: &'static str },

    #[error("field '{field}': '{value}' is not an integer")]
    InvalidInteger { field: &'static str, value: String },

    #[error("field '{field}': '{value}' is not a finite number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("field '{field}': '{value}' is not a recognised timestamp")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("field '{field}': unknown order status '{value}'")]
    InvalidStatus { field: &'static str, value: String },

    #[error("field '{field}': {value} is outside {expected}")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("'{later}' precedes '{earlier}'")]
    OutOfOrder {
        earlier: &'static str,
        later: &'static str,
    },

    #[error("returned_at is set but status is {status}")]
    ReturnedWithoutReturnStatus { status: OrderStatus },
}

/// Failure reported by a [`crate::store::Store`]
///
/// Tolerated e-mail conflicts are not errors; they come back as
/// [`crate::store::CreateOutcome::Conflict`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} violates unique constraint '{constraint}'")]
    DuplicateKey {
        entity: EntityKind,
        constraint: String,
    },

    #[error("{entity} violates foreign key '{constraint}'")]
    MissingReference {
        entity: EntityKind,
        constraint: String,
    },

    #[error("{entity} written before {pending} finished loading")]
    OutOfOrder {
        entity: EntityKind,
        pending: EntityKind,
    },

    #[error("{entity} ran out of generated ids")]
    IdsExhausted { entity: EntityKind },

    #[error("store has been closed")]
    Closed,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Anything that stops a loader at a given row
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open {}: {source}", .path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid row: {0}")]
    Validation(#[from] ValidationError),

    #[error("store rejected row: {0}")]
    Store(#[from] StoreError),
}

/// Terminal outcome of a failed ingestion run
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("{entity} load failed at {}: {source}", describe_row(*.row))]
    Failed {
        entity: EntityKind,
        row: Option<u64>,
        #[source]
        source: LoadError,
    },

    #[error("ingestion aborted before {entity} finished loading")]
    Aborted { entity: EntityKind },
}

impl IngestError {
    pub fn entity(&self) -> EntityKind {
        match self {
            IngestError::Failed { entity, .. } | IngestError::Aborted { entity } => *entity,
        }
    }

    pub fn row(&self) -> Option<u64> {
        match self {
            IngestError::Failed { row, .. } => *row,
            IngestError::Aborted { .. } => None,
        }
    }
}

fn describe_row(row: Option<u64>) -> String {
    match row {
        Some(0) => "header".to_string(),
        Some(row) => format!("row {}", row),
        None => "completion".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_every_column() {
        let err = DecodeError::MissingColumns {
            missing: vec!["email".to_string(), "city".to_string()],
        };
        assert_eq!(err.row(), 0);
        assert_eq!(err.to_string(), "header is missing column(s): email, city");
    }

    #[test]
    fn test_failed_names_entity_and_row() {
        let err = IngestError::Failed {
            entity: EntityKind::Order,
            row: Some(3),
            source: ValidationError::InvalidInteger {
                field: "user_id",
                value: "abc".to_string(),
            }
            .into(),
        };

        assert_eq!(err.entity(), EntityKind::Order);
        assert_eq!(err.row(), Some(3));
        assert_eq!(
            err.to_string(),
            "order load failed at row 3: invalid row: field 'user_id': 'abc' is not an integer"
        );
    }

    #[test]
    fn test_header_failures_are_labelled() {
        let err = IngestError::Failed {
            entity: EntityKind::User,
            row: Some(0),
            source: DecodeError::MissingColumns {
                missing: vec!["email".to_string()],
            }
            .into(),
        };
        assert!(err.to_string().starts_with("user load failed at header"));
    }
}

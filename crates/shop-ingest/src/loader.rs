//! Generic entity loader
//!
//! Drives one source file through decode, validation and persistence for any
//! [`EntitySchema`]. Rows are pulled one at a time and each store call is
//! awaited before the next row is read.

use shop_common::EntityKind;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::decoder::RowDecoder;
use crate::error::{IngestError, LoadError};
use crate::schema::EntitySchema;
use crate::store::{CreateOutcome, Store};

/// Outcome of one loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadStats {
    pub entity: EntityKind,
    /// Data rows read from the source
    pub rows: u64,
    pub created: u64,
    /// Natural keys of rows skipped as duplicates
    pub conflicts: Vec<String>,
    /// Row count reported by the store once the kind was completed
    pub persisted: Option<u64>,
}

impl LoadStats {
    pub fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            rows: 0,
            created: 0,
            conflicts: Vec::new(),
            persisted: None,
        }
    }
}

pub struct EntityLoader<'a> {
    store: &'a dyn Store,
    delimiter: u8,
    cancel: CancellationToken,
}

impl<'a> EntityLoader<'a> {
    pub fn new(store: &'a dyn Store, delimiter: u8) -> Self {
        Self {
            store,
            delimiter,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Load `S::SOURCE_FILE` from `data_dir`
    pub async fn load_from_dir<S: EntitySchema>(&self, data_dir: &Path) -> Result<LoadStats, IngestError> {
        let path = data_dir.join(S::SOURCE_FILE);
        let file = File::open(&path).map_err(|source| IngestError::Failed {
            entity: S::KIND,
            row: None,
            source: LoadError::Source { path: path.clone(), source },
        })?;

        info!(entity = %S::KIND, path = %path.display(), "Loading source file");
        self.load::<S, _>(BufReader::new(file)).await
    }

    #[instrument(name = "load", skip_all, fields(entity = %S::KIND))]
    pub async fn load<S, R>(&self, source: R) -> Result<LoadStats, IngestError>
    where
        S: EntitySchema,
        R: Read + Send,
    {
        let failed = |row: u64, source: LoadError| IngestError::Failed {
            entity: S::KIND,
            row: Some(row),
            source,
        };

        let decoder = RowDecoder::new(source, self.delimiter).map_err(|e| failed(e.row(), e.into()))?;
        decoder
            .require_columns(S::COLUMNS)
            .map_err(|e| failed(e.row(), e.into()))?;

        let mut stats = LoadStats::new(S::KIND);

        for row in decoder {
            if self.cancel.is_cancelled() {
                warn!(rows = stats.rows, "Cancelled mid-load");
                return Err(IngestError::Aborted { entity: S::KIND });
            }

            let row = row.map_err(|e| failed(e.row(), e.into()))?;
            let ordinal = row.ordinal();
            stats.rows += 1;

            let entity = S::decode(&row)
                .map_err(|e| failed(ordinal, e.into()))?
                .into_entity();

            match self
                .store
                .create_if_absent(&entity)
                .await
                .map_err(|e| failed(ordinal, e.into()))?
            {
                CreateOutcome::Created { id } => {
                    stats.created += 1;
                    debug!(row = ordinal, id, "Created");
                },
                CreateOutcome::Conflict { key } => {
                    warn!(row = ordinal, key = %key, "Skipping row with duplicate natural key");
                    stats.conflicts.push(key);
                },
            }
        }

        info!(
            rows = stats.rows,
            created = stats.created,
            conflicts = stats.conflicts.len(),
            "Source consumed"
        );

        Ok(stats)
    }
}

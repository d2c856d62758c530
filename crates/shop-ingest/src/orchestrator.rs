//! Ingestion orchestrator
//!
//! Runs one loader per entity kind in [`EntityKind::LOAD_ORDER`], strictly one
//! after another. The first fatal failure stops the run; rows already stored
//! stay stored. The store is closed on every exit path.

use shop_common::EntityKind;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::config::SourceConfig;
use crate::error::IngestError;
use crate::loader::{EntityLoader, LoadStats};
use crate::schema::{DistributionCenter, InventoryItem, Order, OrderItem, Product, User};
use crate::store::Store;

/// Per-kind results of a completed run, in load order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub loads: Vec<LoadStats>,
}

impl IngestReport {
    pub fn stats(&self, kind: EntityKind) -> Option<&LoadStats> {
        self.loads.iter().find(|s| s.entity == kind)
    }

    pub fn total_created(&self) -> u64 {
        self.loads.iter().map(|s| s.created).sum()
    }

    pub fn total_conflicts(&self) -> usize {
        self.loads.iter().map(|s| s.conflicts.len()).sum()
    }

    /// Log persisted counts per table
    pub fn log_summary(&self) {
        for stats in &self.loads {
            info!(
                entity = %stats.entity,
                table = stats.entity.table_name(),
                rows = stats.rows,
                created = stats.created,
                conflicts = stats.conflicts.len(),
                persisted = stats.persisted.unwrap_or_default(),
                "Table loaded"
            );
        }
        info!(
            created = self.total_created(),
            conflicts = self.total_conflicts(),
            "Ingestion complete"
        );
    }
}

pub struct IngestOrchestrator {
    sources: SourceConfig,
    store: Arc<dyn Store>,
    cancel: CancellationToken,
}

impl IngestOrchestrator {
    pub fn new(sources: SourceConfig, store: Arc<dyn Store>) -> Self {
        Self {
            sources,
            store,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that aborts the run when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Load every kind, then release the store whatever the outcome
    #[instrument(name = "ingest", skip(self), fields(data_dir = %self.sources.data_dir.display()))]
    pub async fn run(self) -> Result<IngestReport, IngestError> {
        info!("Starting ingestion");

        let result = self.load_all().await;
        if let Err(ref e) = result {
            error!(entity = %e.entity(), row = ?e.row(), error = %e, "Ingestion stopped");
        }

        self.store.close().await;
        info!("Store released");

        result
    }

    async fn load_all(&self) -> Result<IngestReport, IngestError> {
        let mut report = IngestReport::default();

        for kind in EntityKind::LOAD_ORDER {
            if self.cancel.is_cancelled() {
                warn!(entity = %kind, "Cancelled before loader started");
                return Err(IngestError::Aborted { entity: kind });
            }
            report.loads.push(self.load_kind(kind).await?);
        }

        Ok(report)
    }

    async fn load_kind(&self, kind: EntityKind) -> Result<LoadStats, IngestError> {
        let loader = EntityLoader::new(self.store.as_ref(), self.sources.delimiter)
            .with_cancellation(self.cancel.clone());
        let dir = self.sources.data_dir.as_path();

        let mut stats = match kind {
            EntityKind::DistributionCenter => loader.load_from_dir::<DistributionCenter>(dir).await?,
            EntityKind::User => loader.load_from_dir::<User>(dir).await?,
            EntityKind::Product => loader.load_from_dir::<Product>(dir).await?,
            EntityKind::InventoryItem => loader.load_from_dir::<InventoryItem>(dir).await?,
            EntityKind::Order => loader.load_from_dir::<Order>(dir).await?,
            EntityKind::OrderItem => loader.load_from_dir::<OrderItem>(dir).await?,
        };

        let persisted = self
            .store
            .complete(kind)
            .await
            .map_err(|source| IngestError::Failed {
                entity: kind,
                row: None,
                source: source.into(),
            })?;
        stats.persisted = Some(persisted);

        info!(
            entity = %kind,
            created = stats.created,
            conflicts = stats.conflicts.len(),
            persisted,
            "Entity load complete"
        );

        Ok(stats)
    }
}

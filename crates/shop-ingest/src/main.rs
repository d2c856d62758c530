//! Shoplens Ingest - load the CSV exports into Postgres

use anyhow::Result;
use clap::Parser;
use shop_common::logging::{init_logging, LogConfig};
use shop_ingest::{IngestConfig, IngestOrchestrator, PgStore};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "shop-ingest")]
#[command(
    author,
    version,
    about = "Load the e-commerce CSV exports into the reporting database",
    long_about = "Reads distribution_centers, users, products, inventory_items, orders and \
                  order_items CSV files from SHOP_DATA_DIR and inserts them in that order \
                  into DATABASE_URL."
)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _cli = Cli::parse();

    let log_config = LogConfig::builder()
        .log_file_prefix("shop-ingest")
        .filter_directives("sqlx=warn")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    let config = IngestConfig::load()?;
    info!(
        data_dir = %config.sources.data_dir.display(),
        delimiter = %(config.sources.delimiter as char),
        "Configuration loaded"
    );

    let store = PgStore::connect(&config.database).await?;
    store.migrate().await?;

    let orchestrator = IngestOrchestrator::new(config.sources, Arc::new(store));

    let cancel = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current row");
            cancel.cancel();
        }
    });

    let report = orchestrator.run().await?;
    report.log_summary();

    Ok(())
}

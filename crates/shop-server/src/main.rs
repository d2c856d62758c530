//! Shoplens Server - read-only reporting API

use anyhow::{Context, Result};
use shop_common::logging::{init_logging, LogConfig};
use shop_server::{api, config::Config, db};
use std::{net::SocketAddr, time::Duration};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let log_config = LogConfig::builder()
        .log_file_prefix("shop-server")
        .filter_directives("shop_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    info!("Starting Shoplens Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let pool = db::create_pool(&config.database)
        .await
        .context("Failed to connect to the database")?;

    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Database migrations completed");

    let app = api::router(pool.clone(), &config.cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    pool.close().await;
    info!("Server shut down gracefully");

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM, then arm a hard deadline for in-flight requests
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        warn!("Shutdown timeout elapsed, exiting with requests still open");
        std::process::exit(1);
    });
}

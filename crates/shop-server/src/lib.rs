//! Shoplens Server Library
//!
//! Read-only JSON API over the tables populated by `shop-ingest`.
//!
//! - `GET /health`
//! - `GET /api/v1/customers`, `/api/v1/customers/:id`, `/api/v1/customers/:id/orders`
//! - `GET /api/v1/orders/:order_id`
//!
//! ```no_run
//! use shop_server::{api, config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let app = api::router(pool, &config.cors);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod db;
pub mod features;
pub mod middleware;
pub mod models;

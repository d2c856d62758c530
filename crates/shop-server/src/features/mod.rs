//! Feature slices of the reporting API
//!
//! Each feature owns its `queries/` (one module per read operation with its
//! own error enum) and a `routes.rs` mapping those errors to HTTP responses.
//!
//! - **customers**: customer listing, detail and order history
//! - **orders**: order detail with the owning customer

pub mod customers;
pub mod orders;
pub mod shared;

use axum::Router;
use sqlx::PgPool;

/// Creates the `/api/v1` router with all feature routes mounted
pub fn router(pool: PgPool) -> Router {
    Router::new()
        .nest("/customers", customers::customers_routes())
        .nest("/orders", orders::orders_routes())
        .with_state(pool)
}

pub mod response;

use crate::config::CorsConfig;
use crate::{db, features, middleware};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use tower_http::compression::CompressionLayer;

/// Build the full application: `/health`, `/api/v1/*` and the HTTP layers
pub fn router(pool: PgPool, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(pool.clone())
        .nest("/api/v1", features::router(pool))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(cors))
}

async fn health(State(pool): State<PgPool>) -> Response {
    match db::health_check(&pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "version": env!("CARGO_PKG_VERSION"),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "disconnected",
                })),
            )
                .into_response()
        },
    }
}

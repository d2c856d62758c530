//! Order API routes
//!
//! - `GET /api/v1/orders/:order_id` - One order with its customer

use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use sqlx::PgPool;

use super::queries::{GetOrderError, GetOrderQuery};

pub fn orders_routes() -> Router<PgPool> {
    Router::new().route("/:order_id", get(get_order))
}

/// `GET /api/v1/orders/:order_id`
///
/// - `200 OK` - order fields plus `user`
/// - `400 Bad Request` - id is not an integer
/// - `404 Not Found` - no such order
#[tracing::instrument(skip(pool, order_id))]
async fn get_order(
    State(pool): State<PgPool>,
    order_id: Result<Path<i32>, PathRejection>,
) -> Result<Response, OrderApiError> {
    let Path(order_id) = order_id?;
    let response = super::queries::get::handle(pool, GetOrderQuery { order_id }).await?;
    Ok(ApiResponse::success(response).into_response())
}

#[derive(Debug, thiserror::Error)]
enum OrderApiError {
    #[error("Invalid order id: {0}")]
    Path(#[from] PathRejection),
    #[error(transparent)]
    Get(#[from] GetOrderError),
}

impl IntoResponse for OrderApiError {
    fn into_response(self) -> Response {
        match &self {
            OrderApiError::Path(_) => ErrorResponse::bad_request(self.to_string()),
            OrderApiError::Get(GetOrderError::NotFound) => ErrorResponse::not_found(self.to_string()),
            OrderApiError::Get(GetOrderError::Database(err)) => ErrorResponse::database(err),
        }
    }
}

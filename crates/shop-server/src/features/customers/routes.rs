//! Customer API routes
//!
//! - `GET /api/v1/customers` - List customers with order counts
//! - `GET /api/v1/customers/:id` - One customer with its orders
//! - `GET /api/v1/customers/:id/orders` - A customer's orders, newest first

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::shared::PaginationParams;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;
use sqlx::PgPool;

use super::queries::{
    GetCustomerError, GetCustomerQuery, ListCustomerOrdersError, ListCustomerOrdersQuery,
    ListCustomersError, ListCustomersQuery,
};

pub fn customers_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(list_customers))
        .route("/:id", get(get_customer))
        .route("/:id/orders", get(list_customer_orders))
}

/// `GET /api/v1/customers?page=1&limit=10`
///
/// - `200 OK` - `data` holds the page, `meta.pagination` the totals
/// - `400 Bad Request` - page below 1 or limit outside 1..=100
#[tracing::instrument(skip(pool, params))]
async fn list_customers(
    State(pool): State<PgPool>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Response, CustomerApiError> {
    let Query(params) = params?;
    let query = ListCustomersQuery { pagination: params };

    let response = super::queries::list::handle(pool, query).await?;
    let meta = json!({ "pagination": response.pagination });

    Ok(ApiResponse::success_with_meta(response.items, meta).into_response())
}

/// `GET /api/v1/customers/:id`
///
/// - `200 OK` - customer, `orders` and `order_count`
/// - `400 Bad Request` - id is not an integer
/// - `404 Not Found` - no such customer
#[tracing::instrument(skip(pool, id))]
async fn get_customer(
    State(pool): State<PgPool>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Response, CustomerApiError> {
    let Path(id) = id?;
    let response = super::queries::get::handle(pool, GetCustomerQuery { id }).await?;
    Ok(ApiResponse::success(response).into_response())
}

/// `GET /api/v1/customers/:id/orders`
#[tracing::instrument(skip(pool, id))]
async fn list_customer_orders(
    State(pool): State<PgPool>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Response, CustomerApiError> {
    let Path(customer_id) = id?;
    let orders =
        super::queries::list_orders::handle(pool, ListCustomerOrdersQuery { customer_id }).await?;
    Ok(ApiResponse::success(orders).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
enum CustomerApiError {
    #[error("Invalid customer id: {0}")]
    Path(#[from] PathRejection),
    #[error("Invalid query parameters: {0}")]
    Query(#[from] QueryRejection),
    #[error(transparent)]
    List(#[from] ListCustomersError),
    #[error(transparent)]
    Get(#[from] GetCustomerError),
    #[error(transparent)]
    Orders(#[from] ListCustomerOrdersError),
}

impl IntoResponse for CustomerApiError {
    fn into_response(self) -> Response {
        match &self {
            CustomerApiError::Path(_)
            | CustomerApiError::Query(_)
            | CustomerApiError::List(ListCustomersError::InvalidPagination(_)) => {
                ErrorResponse::bad_request(self.to_string())
            },
            CustomerApiError::Get(GetCustomerError::NotFound) => {
                ErrorResponse::not_found(self.to_string())
            },
            CustomerApiError::List(ListCustomersError::Database(err))
            | CustomerApiError::Get(GetCustomerError::Database(err))
            | CustomerApiError::Orders(ListCustomerOrdersError::Database(err)) => {
                ErrorResponse::database(err)
            },
        }
    }
}

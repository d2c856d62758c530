use serde::Serialize;
use sqlx::PgPool;

use crate::models::{Customer, Order, CUSTOMER_COLUMNS, ORDER_COLUMNS};

#[derive(Debug, Clone)]
pub struct GetOrderQuery {
    pub order_id: i32,
}

/// An order with its owning customer embedded as `user`
#[derive(Debug, Clone, Serialize)]
pub struct GetOrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub user: Customer,
}

#[derive(Debug, thiserror::Error)]
pub enum GetOrderError {
    #[error("Order not found")]
    NotFound,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: GetOrderQuery) -> Result<GetOrderResponse, GetOrderError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders o WHERE o.order_id = $1");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(query.order_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(GetOrderError::NotFound)?;

    // orders.user_id is a non-null foreign key, so the owner always exists
    let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM users u WHERE u.id = $1");
    let user = sqlx::query_as::<_, Customer>(&sql)
        .bind(order.user_id)
        .fetch_one(&pool)
        .await?;

    Ok(GetOrderResponse { order, user })
}

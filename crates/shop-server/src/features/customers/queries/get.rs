use serde::Serialize;
use sqlx::PgPool;

use crate::models::{Customer, Order, CUSTOMER_COLUMNS};

#[derive(Debug, Clone)]
pub struct GetCustomerQuery {
    pub id: i32,
}

/// A customer with every order they placed, newest first
#[derive(Debug, Clone, Serialize)]
pub struct GetCustomerResponse {
    #[serde(flatten)]
    pub customer: Customer,
    pub orders: Vec<Order>,
    pub order_count: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum GetCustomerError {
    #[error("Customer not found")]
    NotFound,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: GetCustomerQuery,
) -> Result<GetCustomerResponse, GetCustomerError> {
    let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM users u WHERE u.id = $1");
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(query.id)
        .fetch_optional(&pool)
        .await?
        .ok_or(GetCustomerError::NotFound)?;

    let orders = super::list_orders::fetch(&pool, customer.id).await?;
    let order_count = orders.len() as i64;

    Ok(GetCustomerResponse {
        customer,
        orders,
        order_count,
    })
}

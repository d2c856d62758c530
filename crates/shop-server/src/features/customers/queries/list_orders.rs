use sqlx::PgPool;

use crate::models::{Order, ORDER_COLUMNS};

#[derive(Debug, Clone)]
pub struct ListCustomerOrdersQuery {
    pub customer_id: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum ListCustomerOrdersError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Orders of `customer_id`, newest first
///
/// An unknown customer yields an empty list rather than a not-found.
#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListCustomerOrdersQuery,
) -> Result<Vec<Order>, ListCustomerOrdersError> {
    Ok(fetch(&pool, query.customer_id).await?)
}

pub(super) async fn fetch(pool: &PgPool, customer_id: i32) -> Result<Vec<Order>, sqlx::Error> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders o \
         WHERE o.user_id = $1 \
         ORDER BY o.created_at DESC, o.order_id DESC"
    );
    sqlx::query_as::<_, Order>(&sql)
        .bind(customer_id)
        .fetch_all(pool)
        .await
}

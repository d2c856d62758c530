use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::features::shared::{PaginationMetadata, PaginationParams};
use crate::models::{Customer, CUSTOMER_COLUMNS};

#[derive(Debug, Clone, Default)]
pub struct ListCustomersQuery {
    pub pagination: PaginationParams,
}

/// A customer plus how many orders they placed
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub customer: Customer,
    pub order_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListCustomersResponse {
    pub items: Vec<CustomerSummary>,
    pub pagination: PaginationMetadata,
}

#[derive(Debug, thiserror::Error)]
pub enum ListCustomersError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ListCustomersQuery {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            pagination: PaginationParams::new(page, limit),
        }
    }

    pub fn validate(&self) -> Result<(), ListCustomersError> {
        self.pagination
            .validate()
            .map_err(ListCustomersError::InvalidPagination)
    }
}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListCustomersQuery,
) -> Result<ListCustomersResponse, ListCustomersError> {
    query.validate()?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await?;

    let sql = format!(
        "SELECT {CUSTOMER_COLUMNS}, \
                (SELECT COUNT(*) FROM orders o WHERE o.user_id = u.id) AS order_count \
         FROM users u \
         ORDER BY u.id \
         LIMIT $1 OFFSET $2"
    );
    let items = sqlx::query_as::<_, CustomerSummary>(&sql)
        .bind(query.pagination.limit())
        .bind(query.pagination.offset())
        .fetch_all(&pool)
        .await?;

    Ok(ListCustomersResponse {
        items,
        pagination: PaginationMetadata::from_params(&query.pagination, total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_defaults() {
        assert!(ListCustomersQuery::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_large_limit() {
        let err = ListCustomersQuery::new(None, Some(500)).validate();
        assert!(matches!(err, Err(ListCustomersError::InvalidPagination(_))));
    }

    #[test]
    fn test_validation_rejects_zero_page() {
        let err = ListCustomersQuery::new(Some(0), None).validate();
        assert!(matches!(err, Err(ListCustomersError::InvalidPagination(_))));
    }
}

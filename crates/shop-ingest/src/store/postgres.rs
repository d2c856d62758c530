use async_trait::async_trait;
use shop_common::{EntityKind, ShopError};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use super::{CreateOutcome, Store, USER_EMAIL_CONSTRAINT};
use crate::error::StoreError;
use crate::schema::Entity;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the ingestion database
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Read `DATABASE_URL`, `DB_MAX_CONNECTIONS` and `DB_CONNECT_TIMEOUT`
    pub fn from_env() -> shop_common::Result<Self> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| ShopError::Config("DATABASE_URL not set".to_string()))?;

        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let connect_timeout_secs = std::env::var("DB_CONNECT_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);

        Ok(Self {
            url,
            max_connections,
            connect_timeout_secs,
        })
    }
}

/// Postgres-backed store; one `INSERT` per row
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await?;

        tracing::info!(max_connections = config.max_connections, "Database connection pool created");

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Insert one row. `None` means the user e-mail already exists.
    async fn insert(&self, entity: &Entity) -> Result<Option<i32>, sqlx::Error> {
        let query = match entity {
            Entity::DistributionCenter(e) => sqlx::query_scalar(
                r#"
                INSERT INTO distribution_centers (id, name, latitude, longitude)
                VALUES (COALESCE($1, nextval(pg_get_serial_sequence('distribution_centers', 'id'))),
                        $2, $3, $4)
                RETURNING id
                "#,
            )
            .bind(e.id)
            .bind(&e.name)
            .bind(e.latitude)
            .bind(e.longitude),

            Entity::User(e) => sqlx::query_scalar(
                r#"
                INSERT INTO users (id, first_name, last_name, email, age, gender, state,
                                   street_address, postal_code, city, country, latitude,
                                   longitude, traffic_source, created_at)
                VALUES (COALESCE($1, nextval(pg_get_serial_sequence('users', 'id'))),
                        $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                        COALESCE($15, now()))
                ON CONFLICT ON CONSTRAINT users_email_key DO NOTHING
                RETURNING id
                "#,
            )
            .bind(e.id)
            .bind(&e.first_name)
            .bind(&e.last_name)
            .bind(&e.email)
            .bind(e.age)
            .bind(&e.gender)
            .bind(&e.state)
            .bind(&e.street_address)
            .bind(&e.postal_code)
            .bind(&e.city)
            .bind(&e.country)
            .bind(e.latitude)
            .bind(e.longitude)
            .bind(&e.traffic_source)
            .bind(e.created_at),

            Entity::Product(e) => sqlx::query_scalar(
                r#"
                INSERT INTO products (id, name, cost, retail_price, category, brand,
                                      department, sku, distribution_center_id)
                VALUES (COALESCE($1, nextval(pg_get_serial_sequence('products', 'id'))),
                        $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING id
                "#,
            )
            .bind(e.id)
            .bind(&e.name)
            .bind(e.cost)
            .bind(e.retail_price)
            .bind(&e.category)
            .bind(&e.brand)
            .bind(&e.department)
            .bind(&e.sku)
            .bind(e.distribution_center_id),

            Entity::InventoryItem(e) => sqlx::query_scalar(
                r#"
                INSERT INTO inventory_items (id, product_id, created_at, sold_at, cost,
                                             product_category, product_name, product_brand,
                                             product_retail_price, product_department,
                                             product_sku, product_distribution_center_id)
                VALUES (COALESCE($1, nextval(pg_get_serial_sequence('inventory_items', 'id'))),
                        $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                RETURNING id
                "#,
            )
            .bind(e.id)
            .bind(e.product_id)
            .bind(e.created_at)
            .bind(e.sold_at)
            .bind(e.cost)
            .bind(&e.product_category)
            .bind(&e.product_name)
            .bind(&e.product_brand)
            .bind(e.product_retail_price)
            .bind(&e.product_department)
            .bind(&e.product_sku)
            .bind(e.product_distribution_center_id),

            Entity::Order(e) => sqlx::query_scalar(
                r#"
                INSERT INTO orders (order_id, user_id, status, gender, created_at,
                                    shipped_at, delivered_at, returned_at, num_of_item)
                VALUES (COALESCE($1, nextval(pg_get_serial_sequence('orders', 'order_id'))),
                        $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING order_id
                "#,
            )
            .bind(e.order_id)
            .bind(e.user_id)
            .bind(e.status.as_str())
            .bind(&e.gender)
            .bind(e.created_at)
            .bind(e.shipped_at)
            .bind(e.delivered_at)
            .bind(e.returned_at)
            .bind(e.num_of_item),

            Entity::OrderItem(e) => sqlx::query_scalar(
                r#"
                INSERT INTO order_items (id, order_id, user_id, product_id, inventory_item_id,
                                         status, created_at, shipped_at, delivered_at,
                                         returned_at, sale_price)
                VALUES (COALESCE($1, nextval(pg_get_serial_sequence('order_items', 'id'))),
                        $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING id
                "#,
            )
            .bind(e.id)
            .bind(e.order_id)
            .bind(e.user_id)
            .bind(e.product_id)
            .bind(e.inventory_item_id)
            .bind(e.status.as_str())
            .bind(e.created_at)
            .bind(e.shipped_at)
            .bind(e.delivered_at)
            .bind(e.returned_at)
            .bind(e.sale_price),
        };

        query.fetch_optional(&self.pool).await
    }
}

/// Sort a database error into constraint failure or plain error
fn classify(entity: &Entity, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unknown").to_string();

        if db_err.is_unique_violation() {
            return StoreError::DuplicateKey {
                entity: entity.kind(),
                constraint,
            };
        }

        if db_err.is_foreign_key_violation() {
            return StoreError::MissingReference {
                entity: entity.kind(),
                constraint,
            };
        }
    }

    StoreError::Database(err)
}

#[async_trait]
impl Store for PgStore {
    async fn create_if_absent(&self, entity: &Entity) -> Result<CreateOutcome, StoreError> {
        if self.pool.is_closed() {
            return Err(StoreError::Closed);
        }

        match self.insert(entity).await {
            Ok(Some(id)) => Ok(CreateOutcome::Created { id }),
            Ok(None) => {
                tracing::debug!(constraint = USER_EMAIL_CONSTRAINT, key = %entity.natural_key(), "Duplicate e-mail");
                Ok(CreateOutcome::Conflict {
                    key: entity.natural_key(),
                })
            },
            Err(err) => Err(classify(entity, err)),
        }
    }

    async fn complete(&self, kind: EntityKind) -> Result<u64, StoreError> {
        let table = kind.table_name();
        let column = kind.id_column();

        // Rows inserted with explicit ids leave the serial sequence behind
        let resync = format!(
            "SELECT setval(pg_get_serial_sequence('{table}', '{column}'), \
             COALESCE(MAX({column}), 0) + 1, false) FROM {table}"
        );
        sqlx::query(&resync).execute(&self.pool).await?;

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("Database connection pool closed");
    }
}


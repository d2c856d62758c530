//! Row types read by the query façade

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Select list matching [`Customer`]
pub const CUSTOMER_COLUMNS: &str = "u.id, u.first_name, u.last_name, u.email, u.age, u.gender, \
     u.state, u.street_address, u.postal_code, u.city, u.country, u.latitude, u.longitude, \
     u.traffic_source, u.created_at";

/// Select list matching [`Order`]
pub const ORDER_COLUMNS: &str = "o.order_id, o.user_id, o.status, o.gender, o.created_at, \
     o.shipped_at, o.delivered_at, o.returned_at, o.num_of_item";

/// A row of `users`
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<i32>,
    pub gender: String,
    pub state: String,
    pub street_address: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub traffic_source: String,
    pub created_at: DateTime<Utc>,
}

/// A row of `orders`
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub order_id: i32,
    pub user_id: i32,
    pub status: String,
    pub gender: String,
    pub created_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub num_of_item: i32,
}

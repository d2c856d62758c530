use chrono::{DateTime, Utc};
use shop_common::{EntityKind, OrderStatus};

use super::{id_key, Entity, EntitySchema};
use crate::coerce::{self, Fields};
use crate::decoder::Row;
use crate::error::ValidationError;

/// A customer order; keyed by `order_id`
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: Option<i32>,
    pub user_id: i32,
    pub status: OrderStatus,
    pub gender: String,
    pub created_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub num_of_item: i32,
}

impl EntitySchema for Order {
    const KIND: EntityKind = EntityKind::Order;
    const SOURCE_FILE: &'static str = "orders.csv";
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "status",
        "gender",
        "created_at",
        "returned_at",
        "shipped_at",
        "delivered_at",
        "num_of_item",
    ];

    fn decode(row: &Row) -> Result<Self, ValidationError> {
        let fields = Fields::new(row);

        let status = fields.status("status")?;
        let created_at = fields.timestamp("created_at")?;
        let shipped_at = fields.optional_timestamp("shipped_at")?;
        let delivered_at = fields.optional_timestamp("delivered_at")?;
        let returned_at = fields.optional_timestamp("returned_at")?;
        coerce::lifecycle(status, created_at, shipped_at, delivered_at, returned_at)?;

        Ok(Self {
            order_id: fields.optional_integer("order_id")?,
            user_id: fields.integer("user_id")?,
            status,
            gender: fields.text("gender"),
            created_at,
            shipped_at,
            delivered_at,
            returned_at,
            num_of_item: coerce::non_negative_count("num_of_item", fields.integer("num_of_item")?)?,
        })
    }

    fn natural_key(&self) -> String {
        id_key(self.order_id)
    }

    fn into_entity(self) -> Entity {
        Entity::Order(self)
    }
}

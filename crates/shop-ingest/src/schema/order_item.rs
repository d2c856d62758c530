use chrono::{DateTime, Utc};
use shop_common::{EntityKind, OrderStatus};

use super::{id_key, Entity, EntitySchema};
use crate::coerce::{self, Fields};
use crate::decoder::Row;
use crate::error::ValidationError;

/// One line of an order, tied to the inventory unit that was sold
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: Option<i32>,
    pub order_id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub inventory_item_id: i32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub sale_price: f64,
}

impl EntitySchema for OrderItem {
    const KIND: EntityKind = EntityKind::OrderItem;
    const SOURCE_FILE: &'static str = "order_items.csv";
    const COLUMNS: &'static [&'static str] = &[
        "order_id",
        "user_id",
        "product_id",
        "inventory_item_id",
        "status",
        "created_at",
        "shipped_at",
        "delivered_at",
        "returned_at",
        "sale_price",
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
            id: fields.optional_integer("id")?,
            order_id: fields.integer("order_id")?,
            user_id: fields.integer("user_id")?,
            product_id: fields.integer("product_id")?,
            inventory_item_id: fields.integer("inventory_item_id")?,
            status,
            created_at,
            shipped_at,
            delivered_at,
            returned_at,
            sale_price: coerce::non_negative("sale_price", fields.number("sale_price")?)?,
        })
    }

    fn natural_key(&self) -> String {
        id_key(self.id)
    }

    fn into_entity(self) -> Entity {
        Entity::OrderItem(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sale_price_is_rejected() {
        let row = Row::from_pairs(
            2,
            [
                ("order_id", "1"),
                ("user_id", "1"),
                ("product_id", "1"),
                ("inventory_item_id", "1"),
                ("status", "Shipped"),
                ("created_at", "2023-03-01 00:00:00 UTC"),
                ("shipped_at", "2023-03-02 00:00:00 UTC"),
                ("sale_price", ""),
            ],
        );
        assert_eq!(
            OrderItem::decode(&row),
            Err(ValidationError::MissingField { field: "sale_price" })
        );
    }
}

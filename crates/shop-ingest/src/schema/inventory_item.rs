use chrono::{DateTime, Utc};
use shop_common::EntityKind;

use super::{id_key, Entity, EntitySchema};
use crate::coerce::{self, Fields};
use crate::decoder::Row;
use crate::error::ValidationError;

/// A physical unit of a product, with a denormalised copy of its product
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: Option<i32>,
    pub product_id: i32,
    pub created_at: DateTime<Utc>,
    pub sold_at: Option<DateTime<Utc>>,
    pub cost: f64,
    pub product_category: String,
    pub product_name: String,
    pub product_brand: String,
    pub product_retail_price: f64,
    pub product_department: String,
    pub product_sku: String,
    pub product_distribution_center_id: Option<i32>,
}

impl EntitySchema for InventoryItem {
    const KIND: EntityKind = EntityKind::InventoryItem;
    const SOURCE_FILE: &'static str = "inventory_items.csv";
    const COLUMNS: &'static [&'static str] = &[
        "product_id",
        "created_at",
        "sold_at",
        "cost",
        "product_category",
        "product_name",
        "product_brand",
        "product_retail_price",
        "product_department",
        "product_sku",
        "product_distribution_center_id",
    ];

    fn decode(row: &Row) -> Result<Self, ValidationError> {
        let fields = Fields::new(row);

        let created_at = fields.timestamp("created_at")?;
        let sold_at = fields.optional_timestamp("sold_at")?;
        coerce::not_before(("created_at", Some(created_at)), ("sold_at", sold_at))?;

        Ok(Self {
            id: fields.optional_integer("id")?,
            product_id: fields.integer("product_id")?,
            created_at,
            sold_at,
            cost: coerce::non_negative("cost", fields.number("cost")?)?,
            product_category: fields.text("product_category"),
            product_name: fields.text("product_name"),
            product_brand: fields.text("product_brand"),
            product_retail_price: coerce::non_negative(
                "product_retail_price",
                fields.number("product_retail_price")?,
            )?,
            product_department: fields.text("product_department"),
            product_sku: fields.text("product_sku"),
            product_distribution_center_id: fields
                .optional_integer("product_distribution_center_id")?,
        })
    }

    fn natural_key(&self) -> String {
        id_key(self.id)
    }

    fn into_entity(self) -> Entity {
        Entity::InventoryItem(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn row(sold_at: &str) -> Row {
        Row::from_pairs(
            1,
            [
                ("id", "1"),
                ("product_id", "13842"),
                ("created_at", "2022-01-10 00:00:00 UTC"),
                ("sold_at", sold_at),
                ("cost", "2.52"),
                ("product_retail_price", "6.25"),
                ("product_distribution_center_id", "1"),
            ],
        )
    }

    #[test]
    fn test_unsold_item() {
        let item = InventoryItem::decode(&row("")).unwrap();
        assert_eq!(item.sold_at, None);
        assert_eq!(item.product_id, 13842);
        assert_eq!(item.natural_key(), "1");
    }

    #[test]
    fn test_sold_before_created_is_rejected() {
        assert_eq!(
            InventoryItem::decode(&row("2021-12-31 23:59:59 UTC")),
            Err(ValidationError::OutOfOrder {
                earlier: "created_at",
                later: "sold_at"
            })
        );
        assert!(InventoryItem::decode(&row("2022-02-01 12:00:00 UTC")).is_ok());
    }
}

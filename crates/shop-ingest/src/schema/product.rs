use shop_common::EntityKind;

use super::{Entity, EntitySchema};
use crate::coerce::{self, Fields};
use crate::decoder::Row;
use crate::error::ValidationError;

/// A catalogue entry
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Option<i32>,
    pub name: String,
    pub cost: f64,
    pub retail_price: f64,
    pub category: String,
    pub brand: String,
    pub department: String,
    pub sku: String,
    pub distribution_center_id: Option<i32>,
}

impl EntitySchema for Product {
    const KIND: EntityKind = EntityKind::Product;
    const SOURCE_FILE: &'static str = "products.csv";
    const COLUMNS: &'static [&'static str] = &[
        "cost",
        "category",
        "name",
        "brand",
        "retail_price",
        "department",
        "sku",
        "distribution_center_id",
    ];

    fn decode(row: &Row) -> Result<Self, ValidationError> {
        let fields = Fields::new(row);

        Ok(Self {
            id: fields.optional_integer("id")?,
            name: fields.text("name"),
            cost: coerce::non_negative("cost", fields.number("cost")?)?,
            retail_price: coerce::non_negative("retail_price", fields.number("retail_price")?)?,
            category: fields.text("category"),
            brand: fields.text("brand"),
            department: fields.text("department"),
            sku: fields.text("sku"),
            distribution_center_id: fields.optional_integer("distribution_center_id")?,
        })
    }

    fn natural_key(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => self.sku.clone(),
        }
    }

    fn into_entity(self) -> Entity {
        Entity::Product(self)
    }
}

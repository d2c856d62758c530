//! Entity schemas
//!
//! Each record type implements [`EntitySchema`], which tells the generic
//! loader where the rows come from, which columns must be present and how a
//! row becomes a validated record.

mod distribution_center;
mod inventory_item;
mod order;
mod order_item;
mod product;
mod user;

pub use distribution_center::DistributionCenter;
pub use inventory_item::InventoryItem;
pub use order::Order;
pub use order_item::OrderItem;
pub use product::Product;
pub use user::User;

use shop_common::EntityKind;

use crate::decoder::Row;
use crate::error::ValidationError;

/// Describes how one entity type is read from its source file
pub trait EntitySchema: Sized + Send + Sync + 'static {
    const KIND: EntityKind;

    /// File name inside the data directory
    const SOURCE_FILE: &'static str;

    /// Header columns that must be present; `id` columns are optional
    const COLUMNS: &'static [&'static str];

    /// Coerce the row's cells and check the record's invariants
    fn decode(row: &Row) -> Result<Self, ValidationError>;

    /// Key reported when the store refuses the row as a duplicate
    fn natural_key(&self) -> String;

    fn into_entity(self) -> Entity;
}

/// Any record the loaders hand to a store
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    DistributionCenter(DistributionCenter),
    User(User),
    Product(Product),
    InventoryItem(InventoryItem),
    Order(Order),
    OrderItem(OrderItem),
}

/// A foreign key held by an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub column: &'static str,
    pub target: EntityKind,
    pub id: i32,
}

impl Reference {
    fn new(column: &'static str, target: EntityKind, id: i32) -> Self {
        Self { column, target, id }
    }
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::DistributionCenter(_) => EntityKind::DistributionCenter,
            Entity::User(_) => EntityKind::User,
            Entity::Product(_) => EntityKind::Product,
            Entity::InventoryItem(_) => EntityKind::InventoryItem,
            Entity::Order(_) => EntityKind::Order,
            Entity::OrderItem(_) => EntityKind::OrderItem,
        }
    }

    /// Identifier supplied by the source row, if any
    pub fn id(&self) -> Option<i32> {
        match self {
            Entity::DistributionCenter(e) => e.id,
            Entity::User(e) => e.id,
            Entity::Product(e) => e.id,
            Entity::InventoryItem(e) => e.id,
            Entity::Order(e) => e.order_id,
            Entity::OrderItem(e) => e.id,
        }
    }

    pub fn natural_key(&self) -> String {
        match self {
            Entity::DistributionCenter(e) => e.natural_key(),
            Entity::User(e) => e.natural_key(),
            Entity::Product(e) => e.natural_key(),
            Entity::InventoryItem(e) => e.natural_key(),
            Entity::Order(e) => e.natural_key(),
            Entity::OrderItem(e) => e.natural_key(),
        }
    }

    /// Foreign keys that must resolve on an integrity-enforcing store
    pub fn references(&self) -> Vec<Reference> {
        match self {
            Entity::DistributionCenter(_) | Entity::User(_) => Vec::new(),
            Entity::Product(e) => e
                .distribution_center_id
                .map(|id| Reference::new("distribution_center_id", EntityKind::DistributionCenter, id))
                .into_iter()
                .collect(),
            Entity::InventoryItem(e) => {
                vec![Reference::new("product_id", EntityKind::Product, e.product_id)]
            },
            Entity::Order(e) => vec![Reference::new("user_id", EntityKind::User, e.user_id)],
            Entity::OrderItem(e) => vec![
                Reference::new("order_id", EntityKind::Order, e.order_id),
                Reference::new("user_id", EntityKind::User, e.user_id),
                Reference::new("product_id", EntityKind::Product, e.product_id),
                Reference::new("inventory_item_id", EntityKind::InventoryItem, e.inventory_item_id),
            ],
        }
    }
}

/// Natural key for rows without a distinguishing attribute
fn id_key(id: Option<i32>) -> String {
    id.map_or_else(|| "(new)".to_string(), |id| id.to_string())
}

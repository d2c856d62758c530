//! Common types used across Shoplens

use serde::{Deserialize, Serialize};

use crate::error::ShopError;

// ============================================================================
// Entity Kinds
// ============================================================================

/// The entity types populated by ingestion.
///
/// Variants are declared in foreign-key dependency order: every entity only
/// references kinds that appear before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    DistributionCenter,
    User,
    Product,
    InventoryItem,
    Order,
    OrderItem,
}

impl EntityKind {
    /// Fixed ingestion order derived from the foreign-key graph.
    pub const LOAD_ORDER: [EntityKind; 6] = [
        EntityKind::DistributionCenter,
        EntityKind::User,
        EntityKind::Product,
        EntityKind::InventoryItem,
        EntityKind::Order,
        EntityKind::OrderItem,
    ];

    /// Snake-case identifier, also used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::DistributionCenter => "distribution_center",
            EntityKind::User => "user",
            EntityKind::Product => "product",
            EntityKind::InventoryItem => "inventory_item",
            EntityKind::Order => "order",
            EntityKind::OrderItem => "order_item",
        }
    }

    /// Backing table in the relational schema
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::DistributionCenter => "distribution_centers",
            EntityKind::User => "users",
            EntityKind::Product => "products",
            EntityKind::InventoryItem => "inventory_items",
            EntityKind::Order => "orders",
            EntityKind::OrderItem => "order_items",
        }
    }

    /// Primary key column of [`Self::table_name`]
    pub fn id_column(&self) -> &'static str {
        match self {
            EntityKind::Order => "order_id",
            _ => "id",
        }
    }

    /// Kinds this entity holds foreign keys to
    pub fn references(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::DistributionCenter | EntityKind::User => &[],
            EntityKind::Product => &[EntityKind::DistributionCenter],
            EntityKind::InventoryItem => &[EntityKind::Product],
            EntityKind::Order => &[EntityKind::User],
            EntityKind::OrderItem => &[
                EntityKind::Order,
                EntityKind::User,
                EntityKind::Product,
                EntityKind::InventoryItem,
            ],
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Order Lifecycle
// ============================================================================

/// Lifecycle stage shared by orders and their line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
    Complete,
    Cancelled,
    Returned,
}

impl OrderStatus {
    /// Canonical spelling stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Complete => "Complete",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Returned => "Returned",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "complete" => Ok(OrderStatus::Complete),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            "returned" => Ok(OrderStatus::Returned),
            _ => Err(ShopError::UnknownStatus(s.to_string())),
        }
    }
}

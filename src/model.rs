//! Inventory record types

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Category stored when the caller leaves it blank
pub const DEFAULT_CATEGORY: &str = "General";

/// Items with fewer units than this count as low stock
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// A persisted inventory item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub price: f64,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw field set as supplied by a form, CLI or import record.
///
/// Quantity and price arrive as text and are parsed during validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFields {
    pub name: String,
    pub description: Option<String>,
    pub quantity: String,
    pub price: String,
    pub category: Option<String>,
}

impl ItemFields {
    pub fn new(name: &str, quantity: &str, price: &str) -> Self {
        Self {
            name: name.to_string(),
            quantity: quantity.to_string(),
            price: price.to_string(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
}

/// Validated, normalized values ready to be written to the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub price: f64,
    pub category: String,
}

impl NewItem {
    /// Lower-cased name used for case-insensitive identity
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }
}

/// Case-insensitive identity key for an item name
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Blank or missing category falls back to [`DEFAULT_CATEGORY`]
pub fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

/// Aggregate figures over the whole store (computed, never persisted)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryStats {
    pub total_products: i64,
    pub total_value: f64,
    pub low_stock: i64,
    pub categories: i64,
}

/// One row of the per-category report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub items: i64,
    pub value: f64,
}

/// Which fields a search term is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Name or description
    Name,
    Category,
    /// Any mode the caller sent that we do not know; matches nothing
    Unknown,
}

impl FromStr for SearchMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "name" => SearchMode::Name,
            "category" => SearchMode::Category,
            _ => SearchMode::Unknown,
        })
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Name => write!(f, "name"),
            SearchMode::Category => write!(f, "category"),
            SearchMode::Unknown => write!(f, "unknown"),
        }
    }
}

//! Validated create/update/delete
//!
//! These operate on a bare connection and have no mirror side effects;
//! write-through is applied by [`crate::Inventory`].

use crate::error::{InventoryError, Result, ValidationError};
use crate::model::{normalize_category, Item, ItemFields, NewItem};
use crate::query::exists_by_name;
use crate::store;
use rusqlite::Connection;

/// Run the validation rules in order and normalize the input
///
/// 1. name is non-empty after trimming
/// 2. no other item holds the name (case-insensitive), ignoring `exclude_id`
/// 3. quantity is a non-negative integer
/// 4. price is a non-negative number
/// 5. blank category becomes `General`
pub fn validate(
    conn: &Connection,
    fields: &ItemFields,
    exclude_id: Option<i64>,
) -> Result<NewItem> {
    let name = fields.name.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired.into());
    }

    if exists_by_name(conn, name, exclude_id)? {
        return Err(ValidationError::DuplicateName.into());
    }

    let quantity = parse_quantity(&fields.quantity)?;
    let price = parse_price(&fields.price)?;

    Ok(NewItem {
        name: name.to_string(),
        description: fields
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        quantity,
        price,
        category: normalize_category(fields.category.as_deref()),
    })
}

pub(crate) fn parse_quantity(raw: &str) -> std::result::Result<i64, ValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(q) if q >= 0 => Ok(q),
        _ => Err(ValidationError::InvalidQuantity),
    }
}

pub(crate) fn parse_price(raw: &str) -> std::result::Result<f64, ValidationError> {
    match raw.trim().parse::<f64>() {
        Ok(p) if p.is_finite() && p >= 0.0 => Ok(p),
        _ => Err(ValidationError::InvalidPrice),
    }
}

/// Validate and insert a new item
pub fn create_item(conn: &Connection, fields: &ItemFields) -> Result<Item> {
    let item = validate(conn, fields, None)?;
    store::insert_item(conn, &item, store::now())
}

/// Validate and apply new field values to an existing item
///
/// A missing id is reported before any field is validated.
pub fn update_item(conn: &Connection, id: i64, fields: &ItemFields) -> Result<Item> {
    if store::get_item(conn, id)?.is_none() {
        return Err(InventoryError::NotFound(id));
    }
    let item = validate(conn, fields, Some(id))?;
    store::update_item(conn, id, &item, store::now())
}

/// Delete an item, returning the removed record
pub fn delete_item(conn: &Connection, id: i64) -> Result<Item> {
    store::delete_item(conn, id)
}

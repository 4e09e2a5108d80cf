//! Record store: the authoritative `items` table
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Name uniqueness is enforced here by a UNIQUE lower-cased `name_key` column,
//! which backs up the pre-check done by the mutation layer.

use crate::error::{InventoryError, Result};
use crate::model::{Item, NewItem};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// Result type for plain database reads
pub type DbResult<T> = rusqlite::Result<T>;

/// Column list matching [`item_from_row`]
pub(crate) const ITEM_COLUMNS: &str =
    "id, name, description, quantity, price, category, created_at, updated_at";

/// Open (or create) a store file and prepare it for use
pub fn open(path: &Path) -> DbResult<Connection> {
    let conn = Connection::open(path)?;
    prepare(&conn)?;
    log::info!("Opened inventory store: {}", path.display());
    Ok(conn)
}

/// Open a private in-memory store
pub fn open_in_memory() -> DbResult<Connection> {
    let conn = Connection::open_in_memory()?;
    prepare(&conn)?;
    Ok(conn)
}

/// Register SQL functions and create the schema
pub fn prepare(conn: &Connection) -> DbResult<()> {
    register_functions(conn)?;
    init_schema(conn)
}

/// `fold_case(text)` lower-cases with full Unicode rules. SQLite's own
/// `LOWER()` only folds ASCII.
fn register_functions(conn: &Connection) -> DbResult<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|s| s.to_lowercase()))
        },
    )
}

/// Initialize the database schema
///
/// Creates the `items` table if it doesn't exist. The CHECK constraints
/// mirror the validation rules so a bypassed pre-check still cannot store a
/// negative quantity or price or an empty category.
pub fn init_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS items (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            name_key    TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            quantity    INTEGER NOT NULL CHECK (quantity >= 0),
            price       REAL NOT NULL CHECK (price >= 0),
            category    TEXT NOT NULL DEFAULT 'General' CHECK (category <> ''),
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_items_category ON items(category);
        ",
    )?;

    log::info!("Inventory schema initialized");
    Ok(())
}

/// Current time at the resolution timestamps are stored with
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn item_from_row(row: &Row<'_>) -> DbResult<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        quantity: row.get(3)?,
        price: row.get(4)?,
        category: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Turn a UNIQUE violation on `name_key` into [`InventoryError::DuplicateName`]
fn map_write_error(err: rusqlite::Error, name: &str) -> InventoryError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            InventoryError::DuplicateName(name.to_string())
        }
        _ => InventoryError::Database(err),
    }
}

/// Insert a new item, assigning its id and both timestamps
///
/// Fails with [`InventoryError::DuplicateName`] when another item already
/// holds the same case-insensitive name.
pub fn insert_item(conn: &Connection, item: &NewItem, now: DateTime<Utc>) -> Result<Item> {
    conn.execute(
        "INSERT INTO items
         (name, name_key, description, quantity, price, category, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            &item.name,
            item.name_key(),
            &item.description,
            item.quantity,
            item.price,
            &item.category,
            now,
        ],
    )
    .map_err(|e| map_write_error(e, &item.name))?;

    let id = conn.last_insert_rowid();
    log::debug!("Inserted item {} ({})", id, item.name);

    Ok(Item {
        id,
        name: item.name.clone(),
        description: item.description.clone(),
        quantity: item.quantity,
        price: item.price,
        category: item.category.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// Overwrite the mutable fields of an existing item
///
/// `updated_at` always moves forward, even if the clock has not ticked since
/// the previous write.
pub fn update_item(conn: &Connection, id: i64, item: &NewItem, now: DateTime<Utc>) -> Result<Item> {
    let existing = get_item(conn, id)?.ok_or(InventoryError::NotFound(id))?;
    let updated_at = now.max(existing.updated_at + Duration::microseconds(1));

    conn.execute(
        "UPDATE items
         SET name = ?1, name_key = ?2, description = ?3, quantity = ?4,
             price = ?5, category = ?6, updated_at = ?7
         WHERE id = ?8",
        params![
            &item.name,
            item.name_key(),
            &item.description,
            item.quantity,
            item.price,
            &item.category,
            updated_at,
            id,
        ],
    )
    .map_err(|e| map_write_error(e, &item.name))?;

    log::debug!("Updated item {} ({})", id, item.name);

    Ok(Item {
        id,
        name: item.name.clone(),
        description: item.description.clone(),
        quantity: item.quantity,
        price: item.price,
        category: item.category.clone(),
        created_at: existing.created_at,
        updated_at,
    })
}

/// Permanently remove an item, returning what was deleted
pub fn delete_item(conn: &Connection, id: i64) -> Result<Item> {
    let existing = get_item(conn, id)?.ok_or(InventoryError::NotFound(id))?;
    conn.execute("DELETE FROM items WHERE id = ?1", params![id])?;
    log::debug!("Deleted item {} ({})", id, existing.name);
    Ok(existing)
}

/// Look up an item by id. Absence is `Ok(None)`, not an error.
pub fn get_item(conn: &Connection, id: i64) -> DbResult<Option<Item>> {
    conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"),
        params![id],
        item_from_row,
    )
    .optional()
}

/// All items, most recently created first
pub fn list_items(conn: &Connection) -> DbResult<Vec<Item>> {
    let mut stmt = conn.prepare(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id DESC"))?;
    let results: DbResult<Vec<Item>> = stmt.query_map([], item_from_row)?.collect();
    results
}

/// Remove every item. Returns the number of rows deleted.
pub fn clear_items(conn: &Connection) -> DbResult<usize> {
    let removed = conn.execute("DELETE FROM items", [])?;
    log::info!("Cleared {} items from the store", removed);
    Ok(removed)
}

/// Get total count of items
pub fn count_items(conn: &Connection) -> DbResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))
}

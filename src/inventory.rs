//! Inventory handle: store access plus write-through mirror regeneration
//!
//! Every committed create/update/delete/clear, and every committed batch
//! (import, seeding), is followed by one full export pass. The commit always
//! happens first; an export failure is logged and never undoes it.

use crate::config::Config;
use crate::error::Result;
use crate::mirror::{self, ExportReport, ImportSummary, MirrorFormat, MirrorSet};
use crate::model::{CategorySummary, InventoryStats, Item, ItemFields, SearchMode};
use crate::{mutation, query, store};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Explicitly constructed store context. Share it behind an `Arc` across threads.
pub struct Inventory {
    conn: Mutex<Connection>,
    mirrors: MirrorSet,
}

impl Inventory {
    /// Open the file store named by `config`
    pub fn open(config: &Config) -> Result<Self> {
        let conn = store::open(&config.database_path)?;
        Ok(Self::with_connection(conn, MirrorSet::new(&config.mirror_dir)))
    }

    /// Private in-memory store, mirrors written to `mirror_dir`
    pub fn open_in_memory(mirror_dir: impl AsRef<Path>) -> Result<Self> {
        let conn = store::open_in_memory()?;
        Ok(Self::with_connection(conn, MirrorSet::new(mirror_dir.as_ref())))
    }

    fn with_connection(conn: Connection, mirrors: MirrorSet) -> Self {
        Self {
            conn: Mutex::new(conn),
            mirrors,
        }
    }

    /// Store operations are transactional, so a panic elsewhere leaves the
    /// connection usable.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mirrors(&self) -> &MirrorSet {
        &self.mirrors
    }

    // ── Queries ────────────────────────────────────────────────────────────

    pub fn get(&self, id: i64) -> Result<Option<Item>> {
        Ok(store::get_item(&self.lock(), id)?)
    }

    /// All items, newest first
    pub fn list_all(&self) -> Result<Vec<Item>> {
        Ok(store::list_items(&self.lock())?)
    }

    /// The `limit` most recently created items
    pub fn recent(&self, limit: usize) -> Result<Vec<Item>> {
        let mut items = self.list_all()?;
        items.truncate(limit);
        Ok(items)
    }

    pub fn count(&self) -> Result<i64> {
        Ok(store::count_items(&self.lock())?)
    }

    pub fn exists_by_name(&self, name: &str, exclude_id: Option<i64>) -> Result<bool> {
        Ok(query::exists_by_name(&self.lock(), name, exclude_id)?)
    }

    pub fn search(&self, term: &str, mode: SearchMode) -> Result<Vec<Item>> {
        Ok(query::search(&self.lock(), term, mode)?)
    }

    pub fn categories(&self) -> Result<Vec<String>> {
        Ok(query::distinct_categories(&self.lock())?)
    }

    pub fn stats(&self) -> Result<InventoryStats> {
        Ok(query::stats(&self.lock())?)
    }

    pub fn category_breakdown(&self) -> Result<Vec<CategorySummary>> {
        Ok(query::category_breakdown(&self.lock())?)
    }

    // ── Mutations (write-through) ──────────────────────────────────────────

    pub fn create(&self, fields: &ItemFields) -> Result<Item> {
        let conn = self.lock();
        let item = mutation::create_item(&conn, fields)?;
        self.sync(&conn);
        Ok(item)
    }

    pub fn update(&self, id: i64, fields: &ItemFields) -> Result<Item> {
        let conn = self.lock();
        let item = mutation::update_item(&conn, id, fields)?;
        self.sync(&conn);
        Ok(item)
    }

    /// Delete an item, returning the removed record
    pub fn delete(&self, id: i64) -> Result<Item> {
        let conn = self.lock();
        let item = mutation::delete_item(&conn, id)?;
        self.sync(&conn);
        Ok(item)
    }

    /// Remove every item. Returns how many were deleted.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.lock();
        let removed = store::clear_items(&conn)?;
        self.sync(&conn);
        Ok(removed)
    }

    /// Run `f` in one transaction and regenerate mirrors once if it commits
    ///
    /// An error from `f` rolls back everything it wrote.
    pub fn batch<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        self.sync(&conn);
        Ok(value)
    }

    // ── Mirrors ────────────────────────────────────────────────────────────

    /// Regenerate all mirrors now. Safe to call at any time.
    pub fn resync(&self) -> Result<ExportReport> {
        mirror::export_all(&self.lock(), &self.mirrors)
    }

    /// Import a CSV or JSON file, skipping names that already exist
    ///
    /// The format is taken from `format` or else the file extension, and is
    /// checked before the store is touched. The run is all-or-nothing.
    pub fn import_file(&self, path: &Path, format: Option<MirrorFormat>) -> Result<ImportSummary> {
        let format = mirror::resolve_format(path, format)?;
        self.batch(|tx| mirror::import_file(tx, path, format))
    }

    fn sync(&self, conn: &Connection) {
        match mirror::export_all(conn, &self.mirrors) {
            Ok(report) if !report.is_complete() => log::warn!(
                "Mirrors partially refreshed ({} of {} written); run a resync to retry",
                report.written.len(),
                MirrorFormat::ALL.len()
            ),
            Ok(_) => {}
            Err(e) => log::error!("Mirror export skipped, store read failed: {}", e),
        }
    }
}

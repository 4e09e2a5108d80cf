//! Inventory Mirror - product catalog with flat-file mirrors
//!
//! Keeps an inventory catalog in SQLite and regenerates TXT, JSON and CSV
//! mirror exports after every committed change. CSV and JSON mirrors can be
//! imported back; existing names are skipped rather than overwritten.

pub mod config;
pub mod error;
pub mod inventory;
pub mod mirror;
pub mod model;
pub mod mutation;
pub mod query;
pub mod seed;
pub mod store;

pub use config::Config;
pub use error::{ImportError, InventoryError, MirrorWriteError, Result, ValidationError};
pub use inventory::Inventory;
pub use mirror::{ExportReport, ImportSummary, MirrorFormat, MirrorSet};
pub use model::{CategorySummary, InventoryStats, Item, ItemFields, SearchMode};
pub use seed::{seed_sample_items, SeedReport};

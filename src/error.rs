//! Error types for inventory_mirror

use thiserror::Error;

/// Unified error type for inventory operations
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Mutation input rejected before anything was written
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// No item with this id
    #[error("item {0} not found")]
    NotFound(i64),
    /// The store's unique constraint on the name key fired
    #[error("an item named `{0}` already exists")]
    DuplicateName(String),
    /// Import requested for a file type the importer cannot read
    #[error("unsupported import format: {0}")]
    UnsupportedFormat(String),
    /// Import aborted; nothing from the run was kept
    #[error("import failed: {0}")]
    Import(#[from] ImportError),
    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Why a create/update was rejected. The first failing rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name required")]
    NameRequired,
    #[error("duplicate name")]
    DuplicateName,
    #[error("invalid quantity")]
    InvalidQuantity,
    #[error("invalid price")]
    InvalidPrice,
}

/// Cause of an aborted import run
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read import file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Record numbers are 1-based, counting data records only
    #[error("record {record}: missing required field `{field}`")]
    MissingField { record: usize, field: &'static str },
    #[error("record {record}: {field} `{value}` is not a valid number")]
    InvalidNumber {
        record: usize,
        field: &'static str,
        value: String,
    },
    #[error("record {record}: {source}")]
    Rejected {
        record: usize,
        #[source]
        source: ValidationError,
    },
}

/// Failure to write one mirror file. Reported, never propagated.
#[derive(Debug, Error)]
pub enum MirrorWriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InventoryError {
    /// Outcomes the caller is expected to handle (bad input, missing id)
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            InventoryError::Validation(_)
                | InventoryError::NotFound(_)
                | InventoryError::DuplicateName(_)
                | InventoryError::UnsupportedFormat(_)
                | InventoryError::Import(_)
        )
    }
}

/// Result alias for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;

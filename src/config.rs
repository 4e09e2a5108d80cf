//! Store and mirror locations

use std::path::PathBuf;

const APP_DIR: &str = "inventory_mirror";

/// Where the store lives and where its mirrors are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path to the SQLite database file
    pub database_path: PathBuf,
    /// Directory receiving inventory.txt / inventory.json / inventory.csv
    pub mirror_dir: PathBuf,
}

impl Default for Config {
    /// `~/.local/share/inventory_mirror/{inventory.db,mirrors/}` on Linux
    fn default() -> Self {
        let base = data_dir();
        Self {
            database_path: base.join("inventory.db"),
            mirror_dir: base.join("mirrors"),
        }
    }
}

impl Config {
    pub fn new(database_path: impl Into<PathBuf>, mirror_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            mirror_dir: mirror_dir.into(),
        }
    }

    /// Mirrors next to the database file, in a `mirrors/` subdirectory
    pub fn beside_database(database_path: impl Into<PathBuf>) -> Self {
        let database_path = database_path.into();
        let mirror_dir = database_path
            .parent()
            .map(|p| p.join("mirrors"))
            .unwrap_or_else(|| PathBuf::from("mirrors"));
        Self {
            database_path,
            mirror_dir,
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

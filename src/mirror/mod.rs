//! Flat-file mirrors of the item table (TXT, JSON, CSV)
//!
//! Mirrors are projections regenerated wholesale from the store. They are
//! never patched in place and never read back as a source of truth, except
//! by an explicit import.

pub mod export;
pub mod import;

pub use export::{export_all, ExportReport, MirrorFailure};
pub use import::{import_file, resolve_format, ImportSummary};

use crate::error::InventoryError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Base file name shared by all three mirrors
const MIRROR_STEM: &str = "inventory";

/// On-disk mirror representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MirrorFormat {
    Text,
    Json,
    Csv,
}

impl MirrorFormat {
    pub const ALL: [MirrorFormat; 3] = [MirrorFormat::Text, MirrorFormat::Json, MirrorFormat::Csv];

    pub fn extension(self) -> &'static str {
        match self {
            MirrorFormat::Text => "txt",
            MirrorFormat::Json => "json",
            MirrorFormat::Csv => "csv",
        }
    }

    /// Match a file extension, ignoring case
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(MirrorFormat::Text),
            "json" => Some(MirrorFormat::Json),
            "csv" => Some(MirrorFormat::Csv),
            _ => None,
        }
    }

    /// Whether the importer can read this format
    pub fn is_importable(self) -> bool {
        matches!(self, MirrorFormat::Json | MirrorFormat::Csv)
    }
}

impl fmt::Display for MirrorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for MirrorFormat {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim().trim_start_matches('.'))
            .ok_or_else(|| InventoryError::UnsupportedFormat(s.to_string()))
    }
}

/// Locations of the three mirror files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorSet {
    dir: PathBuf,
}

impl MirrorSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the mirror for `format`
    pub fn path(&self, format: MirrorFormat) -> PathBuf {
        self.dir.join(format!("{}.{}", MIRROR_STEM, format.extension()))
    }
}

//! Mirror importer: additive bulk load from a CSV or JSON file
//!
//! A candidate whose name already exists is skipped silently. A record that
//! cannot be parsed aborts the whole run. The caller owns the transaction and
//! the mirror refresh that follows.

use super::MirrorFormat;
use crate::error::{ImportError, InventoryError, Result};
use crate::model::ItemFields;
use crate::mutation::create_item;
use crate::query::exists_by_name;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Counts from one import run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records written to the store
    pub inserted: usize,
    /// Records skipped because the name was already taken
    pub skipped: usize,
}

/// Extra columns (id, timestamps) are ignored; the store assigns its own.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    name: Option<String>,
    description: Option<String>,
    quantity: Option<String>,
    price: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JsonRecord {
    name: Option<String>,
    description: Option<String>,
    quantity: Option<Value>,
    price: Option<Value>,
    category: Option<String>,
}

/// Either the mirror document or a bare list of items
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    Mirror { items: Vec<JsonRecord> },
    Bare(Vec<JsonRecord>),
}

/// One record after format-specific decoding
struct Candidate {
    name: Option<String>,
    description: Option<String>,
    quantity: Option<String>,
    price: Option<String>,
    category: Option<String>,
}

impl From<CsvRecord> for Candidate {
    fn from(r: CsvRecord) -> Self {
        Candidate {
            name: r.name,
            description: r.description,
            quantity: r.quantity,
            price: r.price,
            category: r.category,
        }
    }
}

/// Pick the format from `explicit` or else the file extension
///
/// Fails with [`InventoryError::UnsupportedFormat`] for the text mirror and
/// for anything unrecognized, without touching the file.
pub fn resolve_format(path: &Path, explicit: Option<MirrorFormat>) -> Result<MirrorFormat> {
    let format = match explicit {
        Some(format) => format,
        None => path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(MirrorFormat::from_extension)
            .ok_or_else(|| InventoryError::UnsupportedFormat(path.display().to_string()))?,
    };

    if !format.is_importable() {
        return Err(InventoryError::UnsupportedFormat(format.to_string()));
    }
    Ok(format)
}

/// Import every record of `path` into the store behind `conn`
///
/// CSV is streamed record by record; JSON is read as one document.
pub fn import_file(conn: &Connection, path: &Path, format: MirrorFormat) -> Result<ImportSummary> {
    let summary = match format {
        MirrorFormat::Csv => import_csv(conn, path)?,
        MirrorFormat::Json => import_json(conn, path)?,
        MirrorFormat::Text => return Err(InventoryError::UnsupportedFormat(format.to_string())),
    };

    log::info!(
        "Imported {} from {} ({} inserted, {} already present)",
        format,
        path.display(),
        summary.inserted,
        summary.skipped
    );
    Ok(summary)
}

fn import_csv(conn: &Connection, path: &Path) -> Result<ImportSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(ImportError::from)?;

    let mut summary = ImportSummary::default();
    for (idx, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let record = result.map_err(ImportError::from)?;
        import_candidate(conn, idx + 1, record.into(), &mut summary)?;
    }
    Ok(summary)
}

fn import_json(conn: &Connection, path: &Path) -> Result<ImportSummary> {
    let file = File::open(path).map_err(ImportError::from)?;
    let doc: JsonDocument =
        serde_json::from_reader(BufReader::new(file)).map_err(ImportError::from)?;
    let records = match doc {
        JsonDocument::Mirror { items } => items,
        JsonDocument::Bare(items) => items,
    };

    let mut summary = ImportSummary::default();
    for (idx, record) in records.into_iter().enumerate() {
        let number = idx + 1;
        let candidate = Candidate {
            name: record.name,
            description: record.description,
            quantity: json_number_text(number, "quantity", record.quantity)?,
            price: json_number_text(number, "price", record.price)?,
            category: record.category,
        };
        import_candidate(conn, number, candidate, &mut summary)?;
    }
    Ok(summary)
}

/// Whole-valued floats such as `5.0` render as integers so they pass as a quantity
fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

/// Accept a JSON number or a numeric string; null counts as missing
fn json_number_text(
    record: usize,
    field: &'static str,
    value: Option<Value>,
) -> std::result::Result<Option<String>, ImportError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(Some(number_text(&n))),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(ImportError::InvalidNumber {
            record,
            field,
            value: other.to_string(),
        }),
    }
}

fn require(
    record: usize,
    field: &'static str,
    value: Option<String>,
) -> std::result::Result<String, ImportError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ImportError::MissingField { record, field }),
    }
}

/// Normalize, dedup against the store, then create through the mutation layer
fn import_candidate(
    conn: &Connection,
    record: usize,
    candidate: Candidate,
    summary: &mut ImportSummary,
) -> Result<()> {
    let name = require(record, "name", candidate.name)?;
    let quantity = require(record, "quantity", candidate.quantity)?;
    let price = require(record, "price", candidate.price)?;

    if quantity.parse::<i64>().is_err() {
        return Err(ImportError::InvalidNumber {
            record,
            field: "quantity",
            value: quantity,
        }
        .into());
    }
    if price.parse::<f64>().is_err() {
        return Err(ImportError::InvalidNumber {
            record,
            field: "price",
            value: price,
        }
        .into());
    }

    if exists_by_name(conn, &name, None)? {
        log::debug!("Import record {}: `{}` already exists, skipping", record, name);
        summary.skipped += 1;
        return Ok(());
    }

    let fields = ItemFields {
        name,
        description: candidate.description,
        quantity,
        price,
        category: candidate.category,
    };
    match create_item(conn, &fields) {
        Ok(_) => {
            summary.inserted += 1;
            Ok(())
        }
        Err(InventoryError::Validation(source)) => {
            Err(ImportError::Rejected { record, source }.into())
        }
        Err(e) => Err(e),
    }
}

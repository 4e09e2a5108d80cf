//! Mirror exporter
//!
//! Every pass rewrites all three files from the full item list. There is no
//! incremental path: cost is O(items) per mutation, which is the accepted
//! scaling limit for catalog-sized data.
//!
//! Each file is written to a temp sibling and renamed into place, so a reader
//! never sees a half-written mirror. The three files are not atomic as a
//! group: a failure on one leaves the others at the new snapshot.

use super::{MirrorFormat, MirrorSet};
use crate::error::{MirrorWriteError, Result};
use crate::model::Item;
use crate::query::distinct_categories;
use crate::store::list_items;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Version tag written into the JSON mirror metadata
pub const JSON_FORMAT_VERSION: &str = "1.0";

/// Column order of the CSV mirror
pub const CSV_HEADER: [&str; 8] = [
    "id",
    "name",
    "description",
    "quantity",
    "price",
    "category",
    "created_at",
    "updated_at",
];

const TEXT_DELIMITER: &str = "|";
/// Stands in for a `|` inside a field value; line breaks become spaces.
/// Every data line therefore holds exactly seven fields.
const TEXT_DELIMITER_SUBSTITUTE: &str = "/";
const TEXT_HEADER: [&str; 2] = [
    "# Inventory mirror (TXT, pipe-delimited)",
    "# id|name|description|quantity|price|category|created_at",
];

/// Outcome of one export pass
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Number of items in the exported snapshot
    pub items: usize,
    /// Mirror files replaced successfully
    pub written: Vec<PathBuf>,
    /// Mirror files that could not be written
    pub failures: Vec<MirrorFailure>,
}

impl ExportReport {
    /// True when all three mirrors were replaced
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One mirror file that failed to write
#[derive(Debug)]
pub struct MirrorFailure {
    pub format: MirrorFormat,
    pub path: PathBuf,
    pub error: MirrorWriteError,
}

#[derive(Serialize)]
struct JsonMirror<'a> {
    items: &'a [Item],
    metadata: JsonMetadata<'a>,
}

#[derive(Serialize)]
struct JsonMetadata<'a> {
    version: &'static str,
    exported_at: DateTime<Utc>,
    total_items: usize,
    categories: &'a [String],
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: i64,
    name: &'a str,
    description: &'a str,
    quantity: i64,
    price: f64,
    category: &'a str,
    created_at: String,
    updated_at: String,
}

impl<'a> From<&'a Item> for CsvRow<'a> {
    fn from(item: &'a Item) -> Self {
        CsvRow {
            id: item.id,
            name: &item.name,
            description: &item.description,
            quantity: item.quantity,
            price: item.price,
            category: &item.category,
            created_at: format_timestamp(&item.created_at),
            updated_at: format_timestamp(&item.updated_at),
        }
    }
}

/// RFC 3339 in UTC, matching how timestamps appear in the JSON mirror
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Regenerate all three mirrors from the current store contents
///
/// Only a failure to read the store is returned as an error. File write
/// failures are logged and collected in the report; they never undo anything.
pub fn export_all(conn: &Connection, mirrors: &MirrorSet) -> Result<ExportReport> {
    let items = list_items(conn)?;
    let categories = distinct_categories(conn)?;
    let exported_at = Utc::now();

    let mut report = ExportReport {
        items: items.len(),
        ..Default::default()
    };

    if let Err(e) = fs::create_dir_all(mirrors.dir()) {
        log::warn!(
            "Failed to create mirror directory {}: {}",
            mirrors.dir().display(),
            e
        );
    }

    for format in MirrorFormat::ALL {
        let path = mirrors.path(format);
        let result = write_atomic(&path, |out| match format {
            MirrorFormat::Text => write_text(out, &items),
            MirrorFormat::Json => write_json(out, &items, &categories, exported_at),
            MirrorFormat::Csv => write_csv(out, &items),
        });

        match result {
            Ok(()) => {
                log::debug!("Wrote {} mirror: {}", format, path.display());
                report.written.push(path);
            }
            Err(error) => {
                log::error!("Failed to write {} mirror {}: {}", format, path.display(), error);
                report.failures.push(MirrorFailure {
                    format,
                    path,
                    error,
                });
            }
        }
    }

    log::info!(
        "Exported {} items to {}/{} mirrors",
        report.items,
        report.written.len(),
        MirrorFormat::ALL.len()
    );
    Ok(report)
}

/// Write through a temp file in the same directory, then rename over `path`
fn write_atomic<F>(path: &Path, write: F) -> std::result::Result<(), MirrorWriteError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::result::Result<(), MirrorWriteError>,
{
    let tmp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or_default()
    ));

    let result = (|| -> std::result::Result<(), MirrorWriteError> {
        let mut out = BufWriter::new(File::create(&tmp_path)?);
        write(&mut out)?;
        out.flush()?;
        out.get_ref().sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        // Nothing useful survives in a partial temp file
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_text<W: Write>(out: &mut W, items: &[Item]) -> std::result::Result<(), MirrorWriteError> {
    render_text(out, items)?;
    Ok(())
}

/// Two header lines, then one `|`-joined line per item
pub(crate) fn render_text<W: Write>(out: &mut W, items: &[Item]) -> std::io::Result<()> {
    for line in TEXT_HEADER {
        writeln!(out, "{}", line)?;
    }
    for item in items {
        let fields = [
            item.id.to_string(),
            text_field(&item.name),
            text_field(&item.description),
            item.quantity.to_string(),
            item.price.to_string(),
            text_field(&item.category),
            format_timestamp(&item.created_at),
        ];
        writeln!(out, "{}", fields.join(TEXT_DELIMITER))?;
    }
    Ok(())
}

fn text_field(value: &str) -> String {
    value
        .replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .replace(TEXT_DELIMITER, TEXT_DELIMITER_SUBSTITUTE)
}

fn write_json<W: Write>(
    out: &mut W,
    items: &[Item],
    categories: &[String],
    exported_at: DateTime<Utc>,
) -> std::result::Result<(), MirrorWriteError> {
    let doc = JsonMirror {
        items,
        metadata: JsonMetadata {
            version: JSON_FORMAT_VERSION,
            exported_at,
            total_items: items.len(),
            categories,
        },
    };
    serde_json::to_writer_pretty(&mut *out, &doc)?;
    writeln!(out)?;
    Ok(())
}

fn write_csv<W: Write>(out: &mut W, items: &[Item]) -> std::result::Result<(), MirrorWriteError> {
    // Header written by hand so an empty store still gets one
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    wtr.write_record(CSV_HEADER)?;
    for item in items {
        wtr.serialize(CsvRow::from(item))?;
    }
    wtr.flush()?;
    Ok(())
}

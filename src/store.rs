//! Loading and saving the price table as CSV.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::StoreError;
use crate::record::{COLUMNS, PriceRecord, PriceTable, parse_timestamp};

#[derive(Debug, Deserialize)]
struct StoredRow {
    name: String,
    price: String,
    timestamp: String,
}

/// Reads the whole table. A missing file is a fresh start, not an error;
/// anything unreadable is, so a damaged history is never overwritten.
pub fn load(path: &Path) -> Result<PriceTable, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("{} not found, starting with an empty table", path.display());
            return Ok(PriceTable::new());
        }
        Err(source) => return Err(io_error(path, source)),
    };

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
    if !headers.iter().eq(COLUMNS) {
        return Err(StoreError::Schema {
            path: path.to_path_buf(),
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let raw = result.map_err(|e| csv_error(path, e))?;
        let line = raw.position().map(|p| p.line()).unwrap_or_default();
        let row: StoredRow = raw
            .deserialize(Some(&headers))
            .map_err(|e| csv_error(path, e))?;
        records.push(validate(path, line, row)?);
    }

    debug!("loaded {} rows from {}", records.len(), path.display());
    Ok(PriceTable::from_records(records))
}

fn validate(path: &Path, line: u64, row: StoredRow) -> Result<PriceRecord, StoreError> {
    let corrupt = |reason: String| StoreError::Corrupt {
        path: path.to_path_buf(),
        line,
        reason,
    };
    if row.name.trim().is_empty() {
        return Err(corrupt("empty name".to_string()));
    }
    if row.price.trim().is_empty() {
        return Err(corrupt("empty price".to_string()));
    }
    let timestamp = parse_timestamp(&row.timestamp)
        .map_err(|e| corrupt(format!("bad timestamp '{}': {e}", row.timestamp)))?;
    Ok(PriceRecord {
        name: row.name,
        price: row.price,
        timestamp,
    })
}

/// Writes the whole table next to `path` and renames it into place, so a
/// reader never observes a half-written file.
pub fn save(table: &PriceTable, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let tmp_path = temp_path(path);
    if let Err(err) = write_table(table, &tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_error(path, e)
    })?;

    debug!("saved {} rows to {}", table.len(), path.display());
    Ok(())
}

fn write_table(table: &PriceTable, path: &Path) -> Result<(), StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;
    writer
        .write_record(table.columns())
        .map_err(|e| csv_error(path, e))?;
    for record in table.records() {
        writer.serialize(record).map_err(|e| csv_error(path, e))?;
    }
    writer.flush().map_err(|e| io_error(path, e))
}

fn temp_path(path: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) => {
            let mut tmp = OsString::from(name);
            tmp.push(".tmp");
            path.with_file_name(tmp)
        }
        None => path.with_extension("tmp"),
    }
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path, source: csv::Error) -> StoreError {
    StoreError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

//! Dataset ingestion from CSV, JSON and spreadsheet exports.
//!
//! Cleanup applied before row indices are assigned:
//!
//! - header names are trimmed
//! - empty (or whitespace-only) cells become null
//! - rows where every cell is null are dropped
//! - in columns whose header contains `DATE`, text matching one of the
//!   accepted date patterns becomes a timestamp; anything else is kept so
//!   the type validator can report it

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader};
use chrono::NaiveDateTime;

use gridval_core::dataset::RecordValues;
use gridval_core::value::parse_timestamp;
use gridval_core::{CellValue, CoreError, Dataset};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file format '{extension}' for {} (expected .csv, .json or .xlsx)", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV decode error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON input must be an array of objects: {0}")]
    JsonShape(String),

    #[error("Spreadsheet decode error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Workbook has no worksheet")]
    NoWorksheet,

    #[error("Loaded file contains no data rows")]
    Empty,

    #[error(transparent)]
    Dataset(#[from] CoreError),
}

/// Supported input encodings, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
    /// Excel or OpenDocument workbook; only the first worksheet is read.
    Spreadsheet,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(Self::Spreadsheet),
            _ => Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Load and clean a dataset from `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let format = InputFormat::from_path(path)?;
    tracing::info!(path = %path.display(), ?format, "Loading dataset");

    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dataset = match format {
        InputFormat::Csv => read_csv(std::fs::File::open(path).map_err(io_err)?)?,
        InputFormat::Json => read_json(&std::fs::read_to_string(path).map_err(io_err)?)?,
        InputFormat::Spreadsheet => read_spreadsheet(path)?,
    };

    tracing::info!(
        rows = dataset.len(),
        columns = dataset.columns().len(),
        "Dataset loaded",
    );
    tracing::debug!(columns = ?dataset.columns(), "Dataset columns");
    Ok(dataset)
}

/// Parse CSV with a header row.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let date_columns: Vec<bool> = columns.iter().map(|c| is_date_column(c)).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let values: RecordValues = record
            .iter()
            .zip(&date_columns)
            .map(|(raw, &is_date)| csv_cell(raw, is_date))
            .collect();
        rows.push(values);
    }

    finish(columns, rows)
}

/// Parse a JSON array of flat objects.
///
/// The column set is the union of object keys in first-seen order (keys
/// within one object come back sorted); a key missing from an object is a
/// null cell. Two keys of one object that trim to the same name are
/// rejected, as duplicate CSV headers are.
pub fn read_json(text: &str) -> Result<Dataset, LoadError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(items) = value else {
        return Err(LoadError::JsonShape("top-level value is not an array".into()));
    };

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut objects = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let serde_json::Value::Object(object) = item else {
            return Err(LoadError::JsonShape(format!("element {i} is not an object")));
        };
        let mut cells = Vec::with_capacity(object.len());
        for (key, value) in object {
            let key = key.trim().to_string();
            let pos = match positions.get(&key) {
                Some(&pos) => pos,
                None => {
                    positions.insert(key.clone(), columns.len());
                    columns.push(key);
                    columns.len() - 1
                }
            };
            if cells.iter().any(|&(seen, _)| seen == pos) {
                return Err(CoreError::DuplicateDatasetColumn(columns[pos].clone()).into());
            }
            cells.push((pos, value));
        }
        objects.push(cells);
    }

    let date_columns: Vec<bool> = columns.iter().map(|c| is_date_column(c)).collect();
    let rows = objects
        .into_iter()
        .map(|cells| {
            let mut values: RecordValues = vec![None; columns.len()];
            for (pos, value) in cells {
                values[pos] = json_cell(value, date_columns[pos]);
            }
            values
        })
        .collect();

    finish(columns, rows)
}

/// Read the first worksheet of a workbook.
pub fn read_spreadsheet(path: &Path) -> Result<Dataset, LoadError> {
    let mut workbook = calamine::open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;
    read_range(&range)
}

/// Type a worksheet range whose first row is the header.
///
/// Text cells go through the CSV typing; numbers with no fractional part
/// become integers, since a workbook stores every number as a float.
pub fn read_range(range: &Range<Data>) -> Result<Dataset, LoadError> {
    let mut sheet_rows = range.rows();
    let Some(header) = sheet_rows.next() else {
        return Err(LoadError::Empty);
    };
    let columns: Vec<String> = header.iter().map(|h| h.to_string().trim().to_string()).collect();
    let date_columns: Vec<bool> = columns.iter().map(|c| is_date_column(c)).collect();

    let rows = sheet_rows
        .map(|cells| {
            cells
                .iter()
                .zip(&date_columns)
                .map(|(cell, &is_date)| spreadsheet_cell(cell, is_date))
                .collect()
        })
        .collect();

    finish(columns, rows)
}

fn finish(columns: Vec<String>, rows: Vec<RecordValues>) -> Result<Dataset, LoadError> {
    let before = rows.len();
    let rows: Vec<RecordValues> = rows
        .into_iter()
        .filter(|values| values.iter().any(Option::is_some))
        .collect();
    if rows.len() < before {
        tracing::debug!(dropped = before - rows.len(), "Dropped empty rows");
    }
    if rows.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(Dataset::new(columns, rows)?)
}

fn is_date_column(header: &str) -> bool {
    header.to_uppercase().contains("DATE")
}

/// Type one CSV field: timestamp (date columns only), integer, float, text.
fn csv_cell(raw: &str, is_date: bool) -> Option<CellValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if is_date {
        if let Some(ts) = parse_timestamp(trimmed) {
            return Some(CellValue::Timestamp(ts));
        }
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(CellValue::Integer(i));
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(CellValue::Float(f)),
        _ => Some(CellValue::Text(raw.to_string())),
    }
}

fn spreadsheet_cell(cell: &Data, is_date: bool) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::String(s) => csv_cell(s, is_date),
        Data::Int(i) => Some(CellValue::Integer(*i)),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Some(CellValue::Integer(*f as i64))
        }
        Data::Float(f) => Some(CellValue::Float(*f)),
        Data::Bool(b) => Some(CellValue::Boolean(*b)),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) => Some(CellValue::Timestamp(ts)),
            None => Some(CellValue::Float(dt.as_f64())),
        },
        Data::DateTimeIso(s) => match s.parse::<NaiveDateTime>() {
            Ok(ts) => Some(CellValue::Timestamp(ts)),
            Err(_) => csv_cell(s, is_date),
        },
        Data::DurationIso(s) => csv_cell(s, false),
        Data::Error(e) => Some(CellValue::Text(e.to_string())),
    }
}

fn json_cell(value: serde_json::Value, is_date: bool) -> Option<CellValue> {
    use serde_json::Value;

    match value {
        Value::Null => None,
        Value::Bool(b) => Some(CellValue::Boolean(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(CellValue::Integer(i)),
            None => n.as_f64().map(CellValue::Float),
        },
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => match is_date.then(|| parse_timestamp(&s)).flatten() {
            Some(ts) => Some(CellValue::Timestamp(ts)),
            None => Some(CellValue::Text(s)),
        },
        nested @ (Value::Array(_) | Value::Object(_)) => Some(CellValue::Text(nested.to_string())),
    }
}

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use arrow::array::Array;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Transaction, TransactionTable, REQUIRED_COLUMNS};

#[cfg(test)]
mod tests;

// ---------------------------------------------------------------------------
// Errors and policy
// ---------------------------------------------------------------------------

/// Fatal problems while loading a dataset. Individual bad rows are never
/// reported here; they are dropped and counted.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a top-level JSON array of records")]
    NotRecords,

    #[error("invalid Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("invalid Arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Which missing values make a row unusable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Only the columns the dashboard reads must be present.
    #[default]
    RequiredColumns,
    /// Any empty cell drops the row, including unused extra columns.
    AnyColumn,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a transaction table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` – header row followed by one transaction per line
/// * `.json`         – `[{ "Transaction ID": ..., "Country": ..., ... }, ...]`
/// * `.parquet`      – one column per field, any scalar Arrow type
pub fn load_file(path: &Path, policy: RowPolicy) -> Result<TransactionTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_delimited(path, b',', policy),
        "tsv" => load_delimited(path, b'\t', policy),
        "json" => load_json(path, policy),
        "parquet" | "pq" => load_parquet(path, policy),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

/// Positions of the required columns (in `REQUIRED_COLUMNS` order) and of
/// every other named column.
#[derive(Debug)]
struct ColumnLayout {
    required: [usize; REQUIRED_COLUMNS.len()],
    extras: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| position(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let mut required = [0; REQUIRED_COLUMNS.len()];
        for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = position(name).unwrap_or_default();
        }

        let extras = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| !required.contains(i) && !h.trim().is_empty())
            .map(|(i, h)| (i, h.trim().to_string()))
            .collect();

        Ok(ColumnLayout { required, extras })
    }

    fn extra_names(&self) -> Vec<String> {
        self.extras.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Turn one raw row into a transaction, or `None` if it must be dropped.
    fn parse_row(&self, cells: &[Option<String>], policy: RowPolicy) -> Option<Transaction> {
        let get = |i: usize| {
            cells
                .get(i)
                .and_then(|c| c.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        let [id, date, country, kind, amount, risk, industry] = self.required;

        let amount = get(amount)?.parse::<f64>().ok().filter(|v| v.is_finite())?;
        let risk_score = parse_risk_score(get(risk)?)?;
        let date = parse_date(get(date)?)?;

        let mut extra = BTreeMap::new();
        for (idx, name) in &self.extras {
            match get(*idx) {
                Some(v) => {
                    extra.insert(name.clone(), v.to_string());
                }
                None if policy == RowPolicy::AnyColumn => return None,
                None => {}
            }
        }

        Some(Transaction {
            id: get(id)?.to_string(),
            country: get(country)?.to_string(),
            transaction_type: get(kind)?.to_string(),
            amount,
            risk_score,
            industry: get(industry)?.to_string(),
            date,
            extra,
        })
    }
}

fn finish(
    path: &Path,
    layout: &ColumnLayout,
    records: Vec<Transaction>,
    dropped: usize,
) -> TransactionTable {
    info!(
        "Loaded {} transactions from {} (extra columns {:?})",
        records.len(),
        path.display(),
        layout.extra_names()
    );
    if dropped > 0 {
        warn!(
            "Dropped {dropped} malformed or incomplete row(s) while loading {}",
            path.display()
        );
    }
    TransactionTable::new(records, layout.extra_names(), dropped)
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d %b %Y",
];

/// Permissive date parser. Month-first wins over day-first when both fit.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Risk scores are integers; `7.0` is accepted, `7.5` and values outside
/// the `i64` range are not.
fn parse_risk_score(s: &str) -> Option<i64> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    let f = s.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_delimited(
    path: &Path,
    delimiter: u8,
    policy: RowPolicy,
) -> Result<TransactionTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let layout = ColumnLayout::resolve(&headers)?;

    let mut records = Vec::new();
    let mut dropped = 0;

    for (row_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                debug!("CSV row {row_no}: {e}");
                dropped += 1;
                continue;
            }
        };

        let cells: Vec<Option<String>> = record.iter().map(|c| Some(c.to_string())).collect();
        match layout.parse_row(&cells, policy) {
            Some(tx) => records.push(tx),
            None => dropped += 1,
        }
    }

    Ok(finish(path, &layout, records, dropped))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')` shape.
/// Entries that are not objects count as dropped rows.
fn load_json(path: &Path, policy: RowPolicy) -> Result<TransactionTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;
    let rows = root.as_array().ok_or(LoadError::NotRecords)?;

    let mut headers: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for obj in rows.iter().filter_map(|r| r.as_object()) {
        for key in obj.keys() {
            if seen.insert(key.as_str()) {
                headers.push(key.clone());
            }
        }
    }
    let layout = ColumnLayout::resolve(&headers)?;

    let mut records = Vec::new();
    let mut dropped = 0;

    for row in rows {
        let Some(obj) = row.as_object() else {
            dropped += 1;
            continue;
        };
        let cells: Vec<Option<String>> = headers
            .iter()
            .map(|h| obj.get(h).and_then(json_to_cell))
            .collect();
        match layout.parse_row(&cells, policy) {
            Some(tx) => records.push(tx),
            None => dropped += 1,
        }
    }

    Ok(finish(path, &layout, records, dropped))
}

fn json_to_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas or Polars. Every cell is rendered
/// through Arrow's display formatter and then parsed like a CSV cell, so
/// dates may be strings, `Date32` or timestamps.
fn load_parquet(path: &Path, policy: RowPolicy) -> Result<TransactionTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let layout = ColumnLayout::resolve(&headers)?;
    let reader = builder.build()?;

    let options = FormatOptions::default();
    let mut records = Vec::new();
    let mut dropped = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch.columns();
        let formatters = columns
            .iter()
            .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            let cells: Vec<Option<String>> = columns
                .iter()
                .zip(&formatters)
                .map(|(col, fmt)| (!col.is_null(row)).then(|| fmt.value(row).to_string()))
                .collect();
            match layout.parse_row(&cells, policy) {
                Some(tx) => records.push(tx),
                None => dropped += 1,
            }
        }
    }

    Ok(finish(path, &layout, records, dropped))
}

//! CSV reading into raw rows.
//!
//! Ingestion is deliberately forgiving about shape. Missing expected columns
//! degrade to absent fields and are reported, never fatal; only inputs the
//! CSV layer itself cannot decode (bad quoting, invalid UTF-8) fail. Ragged
//! rows are accepted; short rows read as missing cells.

use crate::ingest::columns::{ColumnMap, ColumnRole};
use crate::table::RawRow;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Errors from reading tabular input.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record at line {line}: {message}")]
    Malformed { line: u64, message: String },
}

impl From<IngestError> for mig_common::Error {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Io { .. } => mig_common::Error::Ingest(err.to_string()),
            IngestError::Malformed { line, message } => {
                mig_common::Error::MalformedRecord { line, message }
            }
        }
    }
}

/// What ingestion saw, alongside the rows it produced.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct IngestReport {
    /// Data rows read (header excluded).
    pub rows_read: u64,
    /// Header cells, verbatim.
    pub columns_seen: Vec<String>,
    /// Canonical names of expected columns absent from the header row.
    /// Non-empty means the input is incomplete; output is still produced.
    pub missing_columns: Vec<String>,
    /// Group-number cells that would not parse as a number (kept as missing).
    pub unparsed_group_nums: u64,
}

impl IngestReport {
    pub fn is_complete(&self) -> bool {
        self.missing_columns.is_empty()
    }
}

/// Rows plus the shape report for one ingested input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ingested {
    pub rows: Vec<RawRow>,
    pub report: IngestReport,
}

/// Read a CSV file into raw rows.
pub fn read_csv_path(path: &Path) -> Result<Ingested, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_csv_bytes(&bytes)
}

/// Read CSV bytes into raw rows.
///
/// Empty input yields zero rows with every expected column reported
/// missing, which downstream treats as an empty, well-typed table.
pub fn read_csv_bytes(bytes: &[u8]) -> Result<Ingested, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = match reader.headers() {
        Ok(record) => record.iter().map(String::from).collect(),
        Err(e) => return Err(malformed(&e)),
    };
    let map = ColumnMap::from_headers(headers.iter().map(String::as_str));

    let mut report = IngestReport {
        columns_seen: headers.clone(),
        missing_columns: map
            .missing_expected()
            .into_iter()
            .map(|role| role.as_str().to_string())
            .collect(),
        ..IngestReport::default()
    };

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| malformed(&e))?;
        let line = idx as u64 + 1;

        let mut row = RawRow {
            project: cell(&record, &map, ColumnRole::Project),
            dev_grp_name: cell(&record, &map, ColumnRole::DevGrpName),
            status_raw: cell(&record, &map, ColumnRole::StatusRaw),
            status_name_raw: cell(&record, &map, ColumnRole::StatusNameRaw),
            dev_grp_num: None,
            extra: BTreeMap::new(),
            line,
        };

        if let Some(raw) = cell(&record, &map, ColumnRole::DevGrpNum) {
            match parse_group_num(&raw) {
                Some(num) => row.dev_grp_num = Some(num),
                None => {
                    report.unparsed_group_nums += 1;
                    debug!(line, value = %raw, "unparseable dev_grp_num, treating as missing");
                }
            }
        }

        for (col, value) in record.iter().enumerate() {
            if mapped_index(&map, col) || value.is_empty() {
                continue;
            }
            let name = headers
                .get(col)
                .cloned()
                .unwrap_or_else(|| format!("column_{}", col + 1));
            row.extra.insert(name, value.to_string());
        }

        rows.push(row);
        report.rows_read += 1;
    }

    debug!(
        rows = report.rows_read,
        missing = ?report.missing_columns,
        "ingested tabular input"
    );

    Ok(Ingested { rows, report })
}

fn malformed(err: &csv::Error) -> IngestError {
    let line = err.position().map(csv::Position::line).unwrap_or(0);
    IngestError::Malformed {
        line,
        message: err.to_string(),
    }
}

/// Fetch a role's cell, treating absent columns, short rows, and
/// whitespace-only cells as missing.
fn cell(record: &csv::StringRecord, map: &ColumnMap, role: ColumnRole) -> Option<String> {
    let idx = map.index_of(role)?;
    let value = record.get(idx)?;
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn mapped_index(map: &ColumnMap, idx: usize) -> bool {
    ColumnRole::ALL
        .into_iter()
        .any(|role| map.index_of(role) == Some(idx))
}

/// Lenient group-number parse: integers, or float spellings with no
/// fractional part (`4`, ` 4 `, `4.0`).
fn parse_group_num(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(f as i64),
        _ => None,
    }
}

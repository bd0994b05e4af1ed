//! Tabular export ingestion: header recognition and CSV reading.

pub mod columns;
pub mod reader;

pub use columns::{role_for_header, ColumnMap, ColumnRole};
pub use reader::{read_csv_bytes, read_csv_path, Ingested, IngestError, IngestReport};

//! Error types for Migration Rollup.

use thiserror::Error;

/// Result type alias for Migration Rollup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Migration Rollup.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("invalid stage map: {0}")]
    InvalidStageMap(String),

    #[error("flags {flag_a} and {flag_b} both claim status code {code:?}")]
    OverlappingFlagCodes {
        flag_a: String,
        flag_b: String,
        code: String,
    },

    // Ingest errors (20-29)
    #[error("ingest failed: {0}")]
    Ingest(String),

    #[error("malformed CSV record at line {line}: {message}")]
    MalformedRecord { line: u64, message: String },

    // Store errors (40-49)
    #[error("dataset store error: {0}")]
    Store(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidStageMap(_) => 11,
            Error::OverlappingFlagCodes { .. } => 12,
            Error::Ingest(_) => 20,
            Error::MalformedRecord { .. } => 21,
            Error::Store(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }
}

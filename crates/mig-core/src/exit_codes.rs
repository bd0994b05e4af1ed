//! Exit codes for the mig-core CLI.
//!
//! Exit codes communicate operation outcome without requiring output parsing.
//! Codes below 10 are data conditions, not faults: an empty rollup and an
//! input missing expected columns both still produce well-formed output.

/// Exit codes for mig-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Rollup produced with data
    Ok = 0,

    /// Rollup produced, but the filtered result set is empty
    NoData = 1,

    /// Input parsed, but expected columns were missing; output still produced.
    /// Takes precedence over NoData when both apply.
    InputIncomplete = 2,

    /// Configuration error (stage map unreadable, invalid, or overlapping)
    ConfigError = 10,

    /// Ingest error (unreadable or malformed tabular input)
    IngestError = 11,

    /// I/O error (dataset store or filesystem)
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(
            self,
            ExitCode::Ok | ExitCode::NoData | ExitCode::InputIncomplete
        )
    }

    /// Check if this exit code indicates an error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Map a unified error to its CLI exit code by numeric range.
    pub fn from_error(err: &mig_common::Error) -> Self {
        match err.code() {
            10..=19 => ExitCode::ConfigError,
            20..=29 => ExitCode::IngestError,
            40..=49 | 60..=69 => ExitCode::IoError,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

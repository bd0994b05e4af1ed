//! Dataset and upload-receipt identity types.
//!
//! A loaded dataset is identified by the SHA-256 of its raw bytes, so
//! identical uploads share an identity regardless of file name or upload
//! time. Receipt IDs label individual save operations.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Content-addressed dataset identity: hex SHA-256 of the raw bytes.
///
/// Used as the snapshot half of memoization keys; two uploads with the
/// same byte content always produce the same `DatasetId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub String);

impl DatasetId {
    /// Compute the identity of a raw dataset.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        DatasetId(hex::encode(hasher.finalize()))
    }

    /// Short display prefix for logs and receipts.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receipt ID for a dataset save operation.
///
/// Format: `upload-<date>-<time>-<random>`
/// Example: `upload-20260823-143022-ab12`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptId(pub String);

impl ReceiptId {
    /// Generate a new receipt ID.
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        let random: String = uuid::Uuid::new_v4()
            .to_string()
            .chars()
            .take(4)
            .collect();
        ReceiptId(format!(
            "upload-{}-{}",
            now.format("%Y%m%d-%H%M%S"),
            random
        ))
    }
}

impl Default for ReceiptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

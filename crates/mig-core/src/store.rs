//! Persisted dataset store.
//!
//! Keeps exactly one dataset: the most recently supplied export, saved
//! byte-for-byte so a later session resumes from the same input without a
//! fresh upload. A JSON receipt sidecar records when and what was saved;
//! its content-addressed dataset id is verified on load, so silent
//! tampering or partial writes surface as errors instead of wrong rollups.

use chrono::{DateTime, Utc};
use mig_common::{schema, DatasetId, ReceiptId, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

const DATASET_DIR: &str = "datasets";
const LATEST_CSV: &str = "latest.csv";
const LATEST_RECEIPT: &str = "latest.json";

/// Errors from dataset store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to resolve data directory")]
    DataDirUnavailable,

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse receipt JSON: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },

    #[error("store corrupt at {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("receipt at {path} has unsupported schema version {version}")]
    IncompatibleSchema { path: PathBuf, version: String },
}

impl From<StoreError> for mig_common::Error {
    fn from(err: StoreError) -> Self {
        mig_common::Error::Store(err.to_string())
    }
}

/// Receipt for one persisted dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub receipt_id: ReceiptId,
    pub dataset_id: DatasetId,
    pub schema_version: String,
    pub saved_at: DateTime<Utc>,
    /// Original file name or other caller-supplied label.
    pub source_name: String,
    pub byte_len: u64,
}

/// Store for the latest persisted dataset.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    data_dir: PathBuf,
}

impl DatasetStore {
    /// Create a store from the environment's data directory.
    pub fn from_env() -> Result<Self, StoreError> {
        Ok(Self {
            data_dir: resolve_data_dir()?,
        })
    }

    /// Create a store rooted at a specific data directory.
    pub fn from_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(DATASET_DIR).join(LATEST_CSV)
    }

    fn receipt_path(&self) -> PathBuf {
        self.data_dir.join(DATASET_DIR).join(LATEST_RECEIPT)
    }

    /// Persist a dataset verbatim, replacing any previous one.
    pub fn save_latest(&self, source_name: &str, bytes: &[u8]) -> Result<UploadReceipt, StoreError> {
        let dir = self.data_dir.join(DATASET_DIR);
        fs::create_dir_all(&dir).map_err(|e| StoreError::Io {
            path: dir.clone(),
            source: e,
        })?;

        let dataset_path = self.dataset_path();
        fs::write(&dataset_path, bytes).map_err(|e| StoreError::Io {
            path: dataset_path.clone(),
            source: e,
        })?;

        let receipt = UploadReceipt {
            receipt_id: ReceiptId::new(),
            dataset_id: DatasetId::from_bytes(bytes),
            schema_version: SCHEMA_VERSION.to_string(),
            saved_at: Utc::now(),
            source_name: source_name.to_string(),
            byte_len: bytes.len() as u64,
        };

        let receipt_path = self.receipt_path();
        let json =
            serde_json::to_string_pretty(&receipt).map_err(|e| StoreError::Json { source: e })?;
        fs::write(&receipt_path, json).map_err(|e| StoreError::Io {
            path: receipt_path.clone(),
            source: e,
        })?;

        debug!(
            dataset = %receipt.dataset_id.short(),
            bytes = receipt.byte_len,
            source = %receipt.source_name,
            "persisted latest dataset"
        );

        Ok(receipt)
    }

    /// Load the persisted dataset, or `None` when nothing was ever saved.
    ///
    /// The receipt's schema version must be compatible and its dataset id
    /// must match the stored bytes.
    pub fn load_latest(&self) -> Result<Option<(Vec<u8>, UploadReceipt)>, StoreError> {
        let dataset_path = self.dataset_path();
        if !dataset_path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&dataset_path).map_err(|e| StoreError::Io {
            path: dataset_path.clone(),
            source: e,
        })?;

        let receipt_path = self.receipt_path();
        if !receipt_path.exists() {
            return Err(StoreError::Corrupt {
                path: receipt_path,
                message: "dataset present but receipt missing".to_string(),
            });
        }
        let content = fs::read_to_string(&receipt_path).map_err(|e| StoreError::Io {
            path: receipt_path.clone(),
            source: e,
        })?;
        let receipt: UploadReceipt =
            serde_json::from_str(&content).map_err(|e| StoreError::Json { source: e })?;

        // A receipt from an incompatible future schema must not resume
        // silently.
        if !schema::is_compatible(&receipt.schema_version) {
            return Err(StoreError::IncompatibleSchema {
                path: receipt_path,
                version: receipt.schema_version,
            });
        }

        let actual = DatasetId::from_bytes(&bytes);
        if actual != receipt.dataset_id {
            warn!(
                expected = %receipt.dataset_id.short(),
                actual = %actual.short(),
                "dataset content does not match its receipt"
            );
            return Err(StoreError::Corrupt {
                path: dataset_path,
                message: format!(
                    "dataset id mismatch: receipt {} vs content {}",
                    receipt.dataset_id.short(),
                    actual.short()
                ),
            });
        }

        Ok(Some((bytes, receipt)))
    }
}

/// Resolve the data directory.
fn resolve_data_dir() -> Result<PathBuf, StoreError> {
    const ENV_DATA_DIR: &str = "MIG_ROLLUP_DATA";
    const DIR_NAME: &str = "migration_rollup";

    // 1) Explicit override
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    // 2) XDG_DATA_HOME
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        if !xdg.is_empty() {
            return Ok(PathBuf::from(xdg).join(DIR_NAME));
        }
    }

    // 3) Platform default
    if let Some(base) = dirs::data_dir() {
        return Ok(base.join(DIR_NAME));
    }

    Err(StoreError::DataDirUnavailable)
}

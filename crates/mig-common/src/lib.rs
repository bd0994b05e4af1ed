//! Migration Rollup common types, IDs, and errors.
//!
//! This crate provides foundational types shared across mig-core modules:
//! - Content-addressed dataset identity and upload receipt IDs
//! - Snapshot schema versioning
//! - Common error types
//! - Output format specifications

pub mod error;
pub mod id;
pub mod output;
pub mod schema;

pub use error::{Error, Result};
pub use id::{DatasetId, ReceiptId};
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;

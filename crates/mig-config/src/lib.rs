//! Migration Rollup configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for stage_map.json (the status→flag mapping table)
//! - Config resolution (CLI → env → XDG → embedded default)
//! - Semantic validation (flag/code disjointness is fatal at startup)
//! - JSON schema generation for the config file format

pub mod resolve;
pub mod stage_map;

pub use resolve::{default_config_path, resolve_stage_map, CONFIG_ENV_VAR};
pub use stage_map::{stage_map_schema, StageFlag, StageMap, StageMapError};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

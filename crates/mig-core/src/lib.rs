//! Migration Rollup core: ingestion, normalization, and aggregation of
//! migration-status exports.
//!
//! The crate turns a wide tabular export (one row per migration job) into
//! per-group stage rollups:
//!
//! - [`ingest`] reads CSV bytes into [`table::RawRow`]s, mapping header
//!   spellings onto canonical columns and degrading gracefully when
//!   expected columns are absent.
//! - [`pipeline`] normalizes status text against the configured stage map,
//!   derives per-stage done flags, applies project/group filters, and
//!   aggregates into [`table::GroupSummaryRow`]s.
//! - [`metrics`] assembles the serializable snapshot: global KPIs, the
//!   group table in display order, the per-dev-group rollup, and melted
//!   per-metric counts.
//! - [`store`] persists the latest export with an upload receipt so later
//!   invocations resume from the same dataset.
//! - [`cache`] memoizes pipeline outcomes per (dataset, filter) pair.
//! - [`output`] renders text tables, tiles, and progress cards.
//!
//! The `mig-core` binary wires these together behind the [`cli`] surface.

pub mod cache;
pub mod cli;
pub mod exit_codes;
pub mod ingest;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod sample;
pub mod store;
pub mod table;

pub use exit_codes::ExitCode;
pub use pipeline::{run, FilterSelection, RollupOutcome};
pub use table::{EnrichedRow, FlagCounts, FlagVector, GroupSummaryRow, RawRow, StatusRow};

//! The rollup pipeline: normalize → derive → filter → aggregate.
//!
//! Each stage is a pure function; `run` composes them over one raw table.
//! There is no incremental path: any filter or dataset change recomputes
//! the whole rollup, which stays well inside interactive budgets at the
//! row counts these exports reach. Memoization (see `crate::cache`) sits
//! on top of `run`, never inside it.

pub mod aggregate;
pub mod derive;
pub mod filter;
pub mod normalize;

pub use filter::FilterSelection;

use crate::table::{EnrichedRow, GroupSummaryRow, RawRow};
use mig_config::StageMap;

/// Everything one pipeline run produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollupOutcome {
    /// Normalized, enriched, filtered rows in input order.
    pub rows: Vec<EnrichedRow>,
    /// Aggregated groups (deterministic key order, not display order).
    pub groups: Vec<GroupSummaryRow>,
    pub excluded_status_rows: u64,
    pub excluded_group_rows: u64,
}

/// Run the full pipeline over a raw table.
pub fn run(raw: &[RawRow], map: &StageMap, selection: &FilterSelection) -> RollupOutcome {
    let normalized = normalize::normalize(raw, map);
    let enriched = derive::derive(normalized.rows, map);
    let rows = filter::apply(&enriched, selection);
    let groups = aggregate::aggregate(&rows);

    RollupOutcome {
        rows,
        groups,
        excluded_status_rows: normalized.excluded_status_rows,
        excluded_group_rows: normalized.excluded_group_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RawRow;

    fn raw(project: &str, group: &str, status: &str) -> RawRow {
        RawRow {
            project: Some(project.into()),
            dev_grp_name: Some(group.into()),
            status_raw: Some(status.into()),
            ..RawRow::default()
        }
    }

    #[test]
    fn run_composes_all_stages() {
        let table = vec![
            raw("Apollo", "Core ETL", "QA"),
            raw("Apollo", "Core ETL", "CNN"),
            raw("Apollo", "Core ETL", "?"),
            raw("Hermes", "Reporting", "ETL"),
        ];
        let map = StageMap::default();
        let outcome = run(&table, &map, &FilterSelection::default());

        assert_eq!(outcome.rows.len(), 3);
        assert_eq!(outcome.excluded_status_rows, 1);
        assert_eq!(outcome.groups.len(), 2);

        let apollo = outcome
            .groups
            .iter()
            .find(|g| g.project.as_deref() == Some("Apollo"))
            .unwrap();
        assert_eq!(apollo.total, 2);
        assert_eq!(apollo.counts.qa_done, 1);
    }

    #[test]
    fn filtered_run_only_aggregates_kept_rows() {
        let table = vec![
            raw("Apollo", "Core ETL", "QA"),
            raw("Hermes", "Core ETL", "QA"),
        ];
        let map = StageMap::default();
        let selection = FilterSelection::from_lists(vec!["Hermes".into()], vec![]);
        let outcome = run(&table, &map, &selection);

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.groups.len(), 1);
        assert_eq!(outcome.groups[0].project.as_deref(), Some("Hermes"));
    }

    #[test]
    fn empty_table_produces_empty_outcome() {
        let map = StageMap::default();
        let outcome = run(&[], &map, &FilterSelection::default());
        assert!(outcome.rows.is_empty());
        assert!(outcome.groups.is_empty());
    }
}

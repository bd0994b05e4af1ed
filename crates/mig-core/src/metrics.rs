//! Read-only metrics over one pipeline outcome.
//!
//! Everything here is a pure projection of `RollupOutcome`: global KPI
//! numbers, the display-ordered group table, the cross-project per-group
//! rollup, and the long-form per-metric counts used by chart consumers.
//! `MetricsSnapshot` packages all of them with provenance for serializing
//! to downstream tools.

use crate::pipeline::{FilterSelection, RollupOutcome};
use crate::table::{display_order, EnrichedRow, FlagCounts, GroupSummaryRow};
use chrono::{DateTime, Utc};
use mig_common::{DatasetId, SCHEMA_VERSION};
use mig_config::StageFlag;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Global metrics over the filtered row set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalMetrics {
    /// Jobs in scope after normalization and filtering.
    pub total_rows: u64,
    /// Distinct known projects (missing values not counted).
    pub distinct_projects: u64,
    /// Distinct known dev group names (missing values not counted).
    pub distinct_dev_groups: u64,
    #[serde(flatten)]
    pub flags: FlagCounts,
}

/// Compute global metrics from the filtered rows.
pub fn global_metrics(rows: &[EnrichedRow]) -> GlobalMetrics {
    let mut projects = BTreeSet::new();
    let mut groups = BTreeSet::new();
    let mut flags = FlagCounts::default();

    for row in rows {
        if let Some(p) = &row.project {
            projects.insert(p.as_str());
        }
        if let Some(g) = &row.dev_grp_name {
            groups.insert(g.as_str());
        }
        flags.add(&row.flags);
    }

    GlobalMetrics {
        total_rows: rows.len() as u64,
        distinct_projects: projects.len() as u64,
        distinct_dev_groups: groups.len() as u64,
        flags,
    }
}

/// Per-dev-group rollup across projects: total jobs and QA-done jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevGroupRollup {
    pub dev_grp_name: Option<String>,
    pub total: u64,
    pub qa_done: u64,
}

impl DevGroupRollup {
    pub fn percent_complete(&self) -> u32 {
        crate::table::percent(self.qa_done, self.total)
    }
}

/// Collapse group summaries across projects, one row per dev group name.
pub fn dev_group_rollup(groups: &[GroupSummaryRow]) -> Vec<DevGroupRollup> {
    let mut by_name: BTreeMap<Option<String>, (u64, u64)> = BTreeMap::new();
    for group in groups {
        let entry = by_name.entry(group.dev_grp_name.clone()).or_default();
        entry.0 += group.total;
        entry.1 += group.counts.qa_done;
    }

    let mut rollup: Vec<DevGroupRollup> = by_name
        .into_iter()
        .map(|(dev_grp_name, (total, qa_done))| DevGroupRollup {
            dev_grp_name,
            total,
            qa_done,
        })
        .collect();
    // Missing name last, matching group-table display order.
    rollup.sort_by(|a, b| match (&a.dev_grp_name, &b.dev_grp_name) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    rollup
}

/// One melted (group, metric) count for long-form consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCount {
    pub project: Option<String>,
    pub dev_grp_name: Option<String>,
    pub total: u64,
    pub metric: String,
    pub count: u64,
}

/// Melt group summaries into long form, one row per (group, flag).
pub fn metric_counts(groups: &[GroupSummaryRow]) -> Vec<MetricCount> {
    let mut counts = Vec::with_capacity(groups.len() * StageFlag::ALL.len());
    for group in groups {
        for flag in StageFlag::ALL {
            counts.push(MetricCount {
                project: group.project.clone(),
                dev_grp_name: group.dev_grp_name.clone(),
                total: group.total,
                metric: flag.as_str().to_string(),
                count: group.counts.get(flag),
            });
        }
    }
    counts
}

/// Distinct filter options available in a normalized table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Sorted distinct project names.
    pub projects: Vec<String>,
    /// Sorted distinct dev group names.
    pub dev_groups: Vec<String>,
}

/// Collect the sorted distinct option lists from (unfiltered) rows.
pub fn filter_options(rows: &[EnrichedRow]) -> FilterOptions {
    let mut projects = BTreeSet::new();
    let mut dev_groups = BTreeSet::new();
    for row in rows {
        if let Some(p) = &row.project {
            projects.insert(p.clone());
        }
        if let Some(g) = &row.dev_grp_name {
            dev_groups.insert(g.clone());
        }
    }
    FilterOptions {
        projects: projects.into_iter().collect(),
        dev_groups: dev_groups.into_iter().collect(),
    }
}

/// A serializable snapshot of everything the rollup exposes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<DatasetId>,
    pub filter: FilterSelection,
    pub global: GlobalMetrics,
    /// Group table in display order.
    pub groups: Vec<GroupSummaryRow>,
    pub dev_group_rollup: Vec<DevGroupRollup>,
    pub metric_counts: Vec<MetricCount>,
    pub excluded_status_rows: u64,
    pub excluded_group_rows: u64,
}

/// Assemble a snapshot from one pipeline outcome.
pub fn snapshot(
    outcome: &RollupOutcome,
    selection: &FilterSelection,
    dataset_id: Option<DatasetId>,
) -> MetricsSnapshot {
    let mut groups = outcome.groups.clone();
    groups.sort_by(display_order);

    MetricsSnapshot {
        schema_version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now(),
        dataset_id,
        filter: selection.clone(),
        global: global_metrics(&outcome.rows),
        dev_group_rollup: dev_group_rollup(&groups),
        metric_counts: metric_counts(&groups),
        groups,
        excluded_status_rows: outcome.excluded_status_rows,
        excluded_group_rows: outcome.excluded_group_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::FlagVector;

    fn row(project: Option<&str>, group: Option<&str>, done: Option<StageFlag>) -> EnrichedRow {
        let mut flags = FlagVector::default();
        if let Some(flag) = done {
            flags.set(flag);
        }
        EnrichedRow {
            project: project.map(String::from),
            dev_grp_name: group.map(String::from),
            dev_grp_num: None,
            status: "QA".into(),
            status_key: "qa".into(),
            flags,
            extra: Default::default(),
        }
    }

    #[test]
    fn global_metrics_count_rows_and_distinct_keys() {
        let rows = vec![
            row(Some("Apollo"), Some("Core ETL"), Some(StageFlag::QaDone)),
            row(Some("Apollo"), Some("Reporting"), Some(StageFlag::SpecDone)),
            row(Some("Hermes"), Some("Core ETL"), None),
            row(None, None, None),
        ];
        let global = global_metrics(&rows);
        assert_eq!(global.total_rows, 4);
        assert_eq!(global.distinct_projects, 2);
        assert_eq!(global.distinct_dev_groups, 2);
        assert_eq!(global.flags.qa_done, 1);
        assert_eq!(global.flags.spec_done, 1);
    }

    #[test]
    fn empty_rows_give_zeroed_metrics() {
        let global = global_metrics(&[]);
        assert_eq!(global.total_rows, 0);
        assert_eq!(global.distinct_projects, 0);
        assert_eq!(global.flags, FlagCounts::default());
    }

    #[test]
    fn rollup_sums_across_projects() {
        let rows = vec![
            row(Some("Apollo"), Some("Core ETL"), Some(StageFlag::QaDone)),
            row(Some("Hermes"), Some("Core ETL"), Some(StageFlag::QaDone)),
            row(Some("Hermes"), Some("Core ETL"), None),
            row(Some("Apollo"), Some("Reporting"), None),
        ];
        let groups = crate::pipeline::aggregate::aggregate(&rows);
        let rollup = dev_group_rollup(&groups);
        assert_eq!(rollup.len(), 2);
        assert_eq!(rollup[0].dev_grp_name.as_deref(), Some("Core ETL"));
        assert_eq!(rollup[0].total, 3);
        assert_eq!(rollup[0].qa_done, 2);
        assert_eq!(rollup[0].percent_complete(), 67);
    }

    #[test]
    fn metric_counts_melt_every_flag() {
        let rows = vec![row(Some("Apollo"), Some("Core ETL"), Some(StageFlag::QaDone))];
        let groups = crate::pipeline::aggregate::aggregate(&rows);
        let counts = metric_counts(&groups);
        assert_eq!(counts.len(), StageFlag::ALL.len());
        let qa = counts.iter().find(|c| c.metric == "qa_done").unwrap();
        assert_eq!(qa.count, 1);
        assert_eq!(qa.total, 1);
        let legacy = counts.iter().find(|c| c.metric == "qa_in_pgrs").unwrap();
        assert_eq!(legacy.count, 0);
    }

    #[test]
    fn filter_options_are_sorted_and_skip_missing() {
        let rows = vec![
            row(Some("Zephyr"), Some("Reporting"), None),
            row(Some("Apollo"), None, None),
            row(None, Some("Core ETL"), None),
            row(Some("Apollo"), Some("Core ETL"), None),
        ];
        let options = filter_options(&rows);
        assert_eq!(options.projects, vec!["Apollo", "Zephyr"]);
        assert_eq!(options.dev_groups, vec!["Core ETL", "Reporting"]);
    }

    #[test]
    fn snapshot_orders_groups_for_display() {
        let rows = vec![
            row(Some("Hermes"), Some("Core ETL"), None),
            row(Some("Apollo"), Some("Reporting"), None),
            row(None, Some("Platform"), None),
            row(Some("Apollo"), Some("Core ETL"), None),
        ];
        let outcome = RollupOutcome {
            groups: crate::pipeline::aggregate::aggregate(&rows),
            rows,
            ..RollupOutcome::default()
        };
        let snap = snapshot(&outcome, &FilterSelection::default(), None);
        let keys: Vec<Option<&str>> = snap.groups.iter().map(|g| g.project.as_deref()).collect();
        assert_eq!(keys, vec![Some("Apollo"), Some("Apollo"), Some("Hermes"), None]);
        assert_eq!(snap.schema_version, SCHEMA_VERSION);
        assert_eq!(snap.global.total_rows, 4);
    }
}

//! Row filtering by allow-sets.
//!
//! Each dimension carries a set of allowed values; an empty set means that
//! dimension is unconstrained. Dimensions combine with AND. A row whose key
//! value is missing passes an empty set and fails a non-empty one, since an
//! absent value cannot match any allowed entry. Filtering is stable.

use crate::table::EnrichedRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The active filter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub projects: BTreeSet<String>,
    pub groups: BTreeSet<String>,
}

impl FilterSelection {
    pub fn from_lists(projects: Vec<String>, groups: Vec<String>) -> Self {
        Self {
            projects: projects.into_iter().collect(),
            groups: groups.into_iter().collect(),
        }
    }

    /// No constraints in any dimension.
    pub fn is_pass_through(&self) -> bool {
        self.projects.is_empty() && self.groups.is_empty()
    }

    pub fn allows(&self, row: &EnrichedRow) -> bool {
        allowed(&self.projects, row.project.as_deref())
            && allowed(&self.groups, row.dev_grp_name.as_deref())
    }

    /// Canonical key for memoization. Sets serialize sorted, so equal
    /// selections always produce equal keys.
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).expect("filter selection serializes")
    }
}

fn allowed(set: &BTreeSet<String>, value: Option<&str>) -> bool {
    if set.is_empty() {
        return true;
    }
    value.is_some_and(|v| set.contains(v))
}

/// Filter rows, preserving input order.
pub fn apply(rows: &[EnrichedRow], selection: &FilterSelection) -> Vec<EnrichedRow> {
    rows.iter()
        .filter(|row| selection.allows(row))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::FlagVector;

    fn row(project: Option<&str>, group: Option<&str>) -> EnrichedRow {
        EnrichedRow {
            project: project.map(String::from),
            dev_grp_name: group.map(String::from),
            dev_grp_num: None,
            status: "QA".into(),
            status_key: "qa".into(),
            flags: FlagVector::default(),
            extra: Default::default(),
        }
    }

    fn sample() -> Vec<EnrichedRow> {
        vec![
            row(Some("Apollo"), Some("Core ETL")),
            row(Some("Apollo"), Some("Reporting")),
            row(Some("Hermes"), Some("Core ETL")),
            row(None, Some("Platform")),
            row(Some("Zephyr"), None),
        ]
    }

    #[test]
    fn empty_selection_passes_everything_through() {
        let rows = sample();
        let selection = FilterSelection::default();
        assert!(selection.is_pass_through());
        assert_eq!(apply(&rows, &selection), rows);
    }

    #[test]
    fn single_dimension_constrains_only_itself() {
        let rows = sample();
        let selection = FilterSelection::from_lists(vec!["Apollo".into()], vec![]);
        let kept = apply(&rows, &selection);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.project.as_deref() == Some("Apollo")));
    }

    #[test]
    fn dimensions_combine_with_and() {
        let rows = sample();
        let selection =
            FilterSelection::from_lists(vec!["Apollo".into()], vec!["Core ETL".into()]);
        let kept = apply(&rows, &selection);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].dev_grp_name.as_deref(), Some("Core ETL"));
    }

    #[test]
    fn missing_key_fails_a_non_empty_set() {
        let rows = sample();
        let selection = FilterSelection::from_lists(vec![], vec!["Platform".into()]);
        let kept = apply(&rows, &selection);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].project, None);

        // The row with a missing group name is dropped by any group filter.
        let selection = FilterSelection::from_lists(vec!["Zephyr".into()], vec!["Core ETL".into()]);
        assert!(apply(&rows, &selection).is_empty());
    }

    #[test]
    fn filtering_preserves_input_order() {
        let rows = sample();
        let selection = FilterSelection::from_lists(vec![], vec!["Core ETL".into()]);
        let kept = apply(&rows, &selection);
        assert_eq!(kept[0].project.as_deref(), Some("Apollo"));
        assert_eq!(kept[1].project.as_deref(), Some("Hermes"));
    }

    #[test]
    fn selecting_nothing_that_exists_yields_empty_not_error() {
        let rows = sample();
        let selection = FilterSelection::from_lists(vec!["Nonesuch".into()], vec![]);
        assert!(apply(&rows, &selection).is_empty());
    }

    #[test]
    fn cache_key_is_order_insensitive() {
        let a = FilterSelection::from_lists(
            vec!["Hermes".into(), "Apollo".into()],
            vec!["Reporting".into()],
        );
        let b = FilterSelection::from_lists(
            vec!["Apollo".into(), "Hermes".into()],
            vec!["Reporting".into()],
        );
        assert_eq!(a.cache_key(), b.cache_key());
        let c = FilterSelection::default();
        assert_ne!(a.cache_key(), c.cache_key());
    }
}

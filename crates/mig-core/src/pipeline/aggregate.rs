//! Group aggregation.
//!
//! Groups enriched rows by (project, dev_grp_name) and sums the flag
//! columns. Rows with a missing key value stay in the rollup as their own
//! group, mirroring how the warehouse view keeps unassigned jobs visible.
//! Output order is deterministic (sorted keys, missing first); callers that
//! present the table apply display ordering themselves.

use crate::table::{EnrichedRow, FlagCounts, GroupSummaryRow};
use std::collections::BTreeMap;

/// Aggregate enriched rows into one summary row per group.
pub fn aggregate(rows: &[EnrichedRow]) -> Vec<GroupSummaryRow> {
    let mut groups: BTreeMap<(Option<String>, Option<String>), (u64, FlagCounts)> =
        BTreeMap::new();

    for row in rows {
        let key = (row.project.clone(), row.dev_grp_name.clone());
        let entry = groups.entry(key).or_default();
        entry.0 += 1;
        entry.1.add(&row.flags);
    }

    groups
        .into_iter()
        .map(|((project, dev_grp_name), (total, counts))| GroupSummaryRow {
            project,
            dev_grp_name,
            total,
            counts,
        })
        .collect()
}

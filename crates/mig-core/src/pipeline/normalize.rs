//! Status normalization.
//!
//! Turns heterogeneous status text into one canonical status per row and
//! drops the rows the rollup must never count: excluded statuses
//! ("Conversion Not Needed") and sentinel group numbers. Everything here is
//! driven by the stage map; no status spelling is hard-coded.
//!
//! Resolution order per row:
//! 1. prefer `status_raw`, falling back to `status_name_raw` when the raw
//!    cell is absent, whitespace, or a null-like literal;
//! 2. empty or `?` resolves to the pending status;
//! 3. excluded statuses drop the row;
//! 4. anything else is kept verbatim (trimmed, casing preserved) with a
//!    lower-cased match key.
//!
//! Normalization is idempotent: re-normalizing its own output changes
//! nothing.

use crate::table::{RawRow, StatusRow};
use mig_config::StageMap;
use tracing::debug;

/// Outcome of one canonical-status resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusResolution {
    /// Row must be removed from the pipeline.
    Excluded,
    /// Canonical status: display text plus lower-cased match key.
    Canonical { status: String, key: String },
}

/// Result of normalizing a raw table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeOutcome {
    pub rows: Vec<StatusRow>,
    /// Rows dropped because their status is excluded.
    pub excluded_status_rows: u64,
    /// Rows dropped because their group number is an excluded sentinel.
    pub excluded_group_rows: u64,
}

/// Resolve the canonical status for one row's status cells.
pub fn resolve_status(
    status_raw: Option<&str>,
    status_name_raw: Option<&str>,
    map: &StageMap,
) -> StatusResolution {
    let source = match usable(status_raw, map) {
        Some(value) => Some(value),
        None => usable(status_name_raw, map),
    };

    let source = match source {
        Some(value) => value,
        // No usable status from either column: pending.
        None => return pending(map),
    };

    if source == "?" {
        return pending(map);
    }

    let key = source.to_lowercase();
    if map.is_excluded_status(&key) {
        return StatusResolution::Excluded;
    }

    StatusResolution::Canonical {
        status: source.to_string(),
        key,
    }
}

/// A status cell's usable value: trimmed, non-empty, not a null-like
/// literal.
fn usable<'a>(cell: Option<&'a str>, map: &StageMap) -> Option<&'a str> {
    let trimmed = cell?.trim();
    if trimmed.is_empty() || map.is_null_literal(trimmed) {
        None
    } else {
        Some(trimmed)
    }
}

fn pending(map: &StageMap) -> StatusResolution {
    StatusResolution::Canonical {
        status: map.pending_status.clone(),
        key: map.pending_status.to_lowercase(),
    }
}

/// Group-key cells treat null-like literals the same way status cells do;
/// kept values stay verbatim.
fn group_key(cell: &Option<String>, map: &StageMap) -> Option<String> {
    let value = cell.as_deref()?;
    let trimmed = value.trim();
    if trimmed.is_empty() || map.is_null_literal(trimmed) {
        None
    } else {
        Some(value.to_string())
    }
}

/// Normalize a raw table.
pub fn normalize(rows: &[RawRow], map: &StageMap) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();

    for raw in rows {
        if let Some(num) = raw.dev_grp_num {
            if map.is_excluded_group_num(num) {
                outcome.excluded_group_rows += 1;
                continue;
            }
        }

        match resolve_status(raw.status_raw.as_deref(), raw.status_name_raw.as_deref(), map) {
            StatusResolution::Excluded => outcome.excluded_status_rows += 1,
            StatusResolution::Canonical { status, key } => outcome.rows.push(StatusRow {
                project: group_key(&raw.project, map),
                dev_grp_name: group_key(&raw.dev_grp_name, map),
                dev_grp_num: raw.dev_grp_num,
                status,
                status_key: key,
                extra: raw.extra.clone(),
            }),
        }
    }

    debug!(
        kept = outcome.rows.len(),
        excluded_status = outcome.excluded_status_rows,
        excluded_group = outcome.excluded_group_rows,
        "normalized raw table"
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> StageMap {
        StageMap::default()
    }

    fn raw(status: Option<&str>, name: Option<&str>) -> RawRow {
        RawRow {
            project: Some("Apollo".into()),
            dev_grp_name: Some("Core ETL".into()),
            status_raw: status.map(String::from),
            status_name_raw: name.map(String::from),
            ..RawRow::default()
        }
    }

    fn canonical(res: StatusResolution) -> (String, String) {
        match res {
            StatusResolution::Canonical { status, key } => (status, key),
            StatusResolution::Excluded => panic!("expected canonical status"),
        }
    }

    #[test]
    fn status_raw_wins_over_status_name() {
        let (status, key) = canonical(resolve_status(Some("ETL"), Some("QA"), &map()));
        assert_eq!(status, "ETL");
        assert_eq!(key, "etl");
    }

    #[test]
    fn null_like_raw_falls_back_to_status_name() {
        for null_like in ["NaN", "nan", "NONE", "none", "", "   "] {
            let (status, _) = canonical(resolve_status(Some(null_like), Some("QA"), &map()));
            assert_eq!(status, "QA", "raw cell {null_like:?}");
        }
    }

    #[test]
    fn empty_question_mark_and_whitespace_resolve_to_pending() {
        for (raw, name) in [
            (None, None),
            (Some("?"), None),
            (Some("  ?  "), None),
            (Some("   "), Some("  ")),
            (Some("nan"), Some("none")),
        ] {
            let (status, key) = canonical(resolve_status(raw, name, &map()));
            assert_eq!(status, "PEND", "({raw:?}, {name:?})");
            assert_eq!(key, "pend");
        }
    }

    #[test]
    fn excluded_status_is_case_and_space_insensitive() {
        for spelling in ["CNN", "cnn", "Cnn", "  CNN  "] {
            assert_eq!(
                resolve_status(Some(spelling), None, &map()),
                StatusResolution::Excluded,
                "{spelling:?}"
            );
        }
    }

    #[test]
    fn excluded_status_from_fallback_column_also_drops() {
        assert_eq!(
            resolve_status(None, Some("CNN"), &map()),
            StatusResolution::Excluded
        );
    }

    #[test]
    fn unknown_status_kept_verbatim_with_lowercase_key() {
        let (status, key) = canonical(resolve_status(Some("  Waiting On Vendor "), None, &map()));
        assert_eq!(status, "Waiting On Vendor");
        assert_eq!(key, "waiting on vendor");
    }

    #[test]
    fn resolution_is_idempotent() {
        let inputs = [
            Some("SPEC"),
            Some("Qa"),
            Some("?"),
            Some("Waiting On Vendor"),
            None,
        ];
        for input in inputs {
            let (status, key) = canonical(resolve_status(input, Some("ETL"), &map()));
            let (status2, key2) = canonical(resolve_status(Some(status.as_str()), None, &map()));
            assert_eq!(status, status2, "{input:?}");
            assert_eq!(key, key2, "{input:?}");
        }
    }

    #[test]
    fn sentinel_group_number_drops_row() {
        let mut row = raw(Some("QA"), None);
        row.dev_grp_num = Some(99);
        let outcome = normalize(&[row], &map());
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.excluded_group_rows, 1);
    }

    #[test]
    fn missing_group_number_is_kept() {
        let outcome = normalize(&[raw(Some("QA"), None)], &map());
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.excluded_group_rows, 0);
    }

    #[test]
    fn null_like_group_keys_become_missing() {
        let mut row = raw(Some("QA"), None);
        row.project = Some("NaN".into());
        row.dev_grp_name = None;
        let outcome = normalize(&[row], &map());
        assert_eq!(outcome.rows[0].project, None);
        assert_eq!(outcome.rows[0].dev_grp_name, None);
    }

    #[test]
    fn exclusion_counts_are_separate() {
        let mut sentinel = raw(Some("QA"), None);
        sentinel.dev_grp_num = Some(99);
        let rows = vec![
            raw(Some("CNN"), None),
            sentinel,
            raw(Some("ETL"), None),
        ];
        let outcome = normalize(&rows, &map());
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.excluded_status_rows, 1);
        assert_eq!(outcome.excluded_group_rows, 1);
    }
}

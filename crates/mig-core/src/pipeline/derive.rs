//! Flag derivation.
//!
//! Looks each row's status match key up in the stage map and sets the one
//! flag that claims it. Unmapped statuses (including pending) derive an
//! all-zero vector and stay in the row set; the legacy in-progress flags
//! have no codes to claim, so they stay zero for every row.

use crate::table::{EnrichedRow, FlagVector, StatusRow};
use mig_config::StageMap;

/// Derive flag vectors, turning status rows into enriched rows.
pub fn derive(rows: Vec<StatusRow>, map: &StageMap) -> Vec<EnrichedRow> {
    rows.into_iter()
        .map(|row| {
            let mut flags = FlagVector::default();
            if let Some(flag) = map.flag_for(&row.status_key) {
                flags.set(flag);
            }
            // Disjointness is validated at map load, so at most one done
            // flag can be set here.
            debug_assert!(flags.done_count() <= 1);

            EnrichedRow {
                project: row.project,
                dev_grp_name: row.dev_grp_name,
                dev_grp_num: row.dev_grp_num,
                status: row.status,
                status_key: row.status_key,
                flags,
                extra: row.extra,
            }
        })
        .collect()
}

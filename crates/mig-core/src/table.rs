//! Row and table types flowing through the rollup pipeline.
//!
//! Each pipeline stage is a pure function from one row shape to the next:
//! `RawRow` (as ingested) → `StatusRow` (canonical status attached, excluded
//! rows gone) → `EnrichedRow` (flag vector derived) → `GroupSummaryRow`
//! (aggregated). Rows are plain serde data; nothing here touches I/O.

use mig_config::StageFlag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A row as parsed from the tabular export, before normalization.
///
/// Fields of interest are `None` when their column is absent from the input
/// or the cell is empty. Columns the pipeline does not know about ride along
/// in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub project: Option<String>,
    pub dev_grp_name: Option<String>,
    pub dev_grp_num: Option<i64>,
    pub status_raw: Option<String>,
    pub status_name_raw: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
    /// 1-based data line in the source, header excluded.
    #[serde(default)]
    pub line: u64,
}

/// A row after status normalization: the canonical status is resolved and
/// rows excluded by status or group-number sentinel are already gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRow {
    pub project: Option<String>,
    pub dev_grp_name: Option<String>,
    pub dev_grp_num: Option<i64>,
    /// Canonical status for display; original casing is preserved for
    /// statuses outside the known vocabulary.
    pub status: String,
    /// Lower-cased match key used for flag derivation.
    pub status_key: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// Per-row completion flags.
///
/// At most one done flag is set per row; the three in-progress flags are
/// legacy columns kept for downstream schema compatibility and are always
/// zero. Serialized as 0/1 integers, matching the historical export shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagVector {
    #[serde(with = "flag01")]
    pub spec_done: bool,
    #[serde(with = "flag01")]
    pub etl_done: bool,
    #[serde(with = "flag01")]
    pub qa_done: bool,
    #[serde(with = "flag01")]
    pub acc_done: bool,
    #[serde(with = "flag01")]
    pub prod_done: bool,
    #[serde(with = "flag01")]
    pub spec_in_pgrs: bool,
    #[serde(with = "flag01")]
    pub etl_in_pgrs: bool,
    #[serde(with = "flag01")]
    pub qa_in_pgrs: bool,
}

impl FlagVector {
    pub fn get(&self, flag: StageFlag) -> bool {
        match flag {
            StageFlag::SpecDone => self.spec_done,
            StageFlag::EtlDone => self.etl_done,
            StageFlag::QaDone => self.qa_done,
            StageFlag::AccDone => self.acc_done,
            StageFlag::ProdDone => self.prod_done,
            StageFlag::SpecInPgrs => self.spec_in_pgrs,
            StageFlag::EtlInPgrs => self.etl_in_pgrs,
            StageFlag::QaInPgrs => self.qa_in_pgrs,
        }
    }

    pub fn set(&mut self, flag: StageFlag) {
        match flag {
            StageFlag::SpecDone => self.spec_done = true,
            StageFlag::EtlDone => self.etl_done = true,
            StageFlag::QaDone => self.qa_done = true,
            StageFlag::AccDone => self.acc_done = true,
            StageFlag::ProdDone => self.prod_done = true,
            StageFlag::SpecInPgrs => self.spec_in_pgrs = true,
            StageFlag::EtlInPgrs => self.etl_in_pgrs = true,
            StageFlag::QaInPgrs => self.qa_in_pgrs = true,
        }
    }

    /// Number of done flags set (0 or 1 for any derived row).
    pub fn done_count(&self) -> u32 {
        StageFlag::DONE.iter().filter(|f| self.get(**f)).count() as u32
    }
}

/// Serialize booleans as 0/1 integers.
mod flag01 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
        let n = u64::deserialize(de)?;
        Ok(n != 0)
    }
}

/// A fully enriched row: canonical status plus derived flag vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow {
    pub project: Option<String>,
    pub dev_grp_name: Option<String>,
    pub dev_grp_num: Option<i64>,
    pub status: String,
    pub status_key: String,
    #[serde(flatten)]
    pub flags: FlagVector,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// Flag counts shared by group summaries and global metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagCounts {
    pub spec_done: u64,
    pub etl_done: u64,
    pub qa_done: u64,
    pub acc_done: u64,
    pub prod_done: u64,
    pub spec_in_pgrs: u64,
    pub etl_in_pgrs: u64,
    pub qa_in_pgrs: u64,
}

impl FlagCounts {
    pub fn get(&self, flag: StageFlag) -> u64 {
        match flag {
            StageFlag::SpecDone => self.spec_done,
            StageFlag::EtlDone => self.etl_done,
            StageFlag::QaDone => self.qa_done,
            StageFlag::AccDone => self.acc_done,
            StageFlag::ProdDone => self.prod_done,
            StageFlag::SpecInPgrs => self.spec_in_pgrs,
            StageFlag::EtlInPgrs => self.etl_in_pgrs,
            StageFlag::QaInPgrs => self.qa_in_pgrs,
        }
    }

    /// Tally one row's flag vector into these counts.
    pub fn add(&mut self, flags: &FlagVector) {
        for flag in StageFlag::ALL {
            if flags.get(flag) {
                match flag {
                    StageFlag::SpecDone => self.spec_done += 1,
                    StageFlag::EtlDone => self.etl_done += 1,
                    StageFlag::QaDone => self.qa_done += 1,
                    StageFlag::AccDone => self.acc_done += 1,
                    StageFlag::ProdDone => self.prod_done += 1,
                    StageFlag::SpecInPgrs => self.spec_in_pgrs += 1,
                    StageFlag::EtlInPgrs => self.etl_in_pgrs += 1,
                    StageFlag::QaInPgrs => self.qa_in_pgrs += 1,
                }
            }
        }
    }

    pub fn merge(&mut self, other: &FlagCounts) {
        self.spec_done += other.spec_done;
        self.etl_done += other.etl_done;
        self.qa_done += other.qa_done;
        self.acc_done += other.acc_done;
        self.prod_done += other.prod_done;
        self.spec_in_pgrs += other.spec_in_pgrs;
        self.etl_in_pgrs += other.etl_in_pgrs;
        self.qa_in_pgrs += other.qa_in_pgrs;
    }
}

/// One aggregated group: (project, dev_grp_name) with totals and flag sums.
///
/// Missing key values form their own group rather than being dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummaryRow {
    pub project: Option<String>,
    pub dev_grp_name: Option<String>,
    pub total: u64,
    #[serde(flatten)]
    pub counts: FlagCounts,
}

impl GroupSummaryRow {
    /// Percent complete for this group: QA-done rows over total.
    pub fn percent_complete(&self) -> u32 {
        percent(self.counts.qa_done, self.total)
    }
}

/// Rounded integer percentage, 0 when the denominator is 0.
pub fn percent(count: u64, total: u64) -> u32 {
    if total == 0 {
        0
    } else {
        (100.0 * count as f64 / total as f64).round() as u32
    }
}

/// Display ordering for group rows: lexicographic ascending by
/// (project, dev_grp_name), missing values after present ones.
pub fn display_order(a: &GroupSummaryRow, b: &GroupSummaryRow) -> std::cmp::Ordering {
    key_order(&a.project, &b.project).then_with(|| key_order(&a.dev_grp_name, &b.dev_grp_name))
}

fn key_order(a: &Option<String>, b: &Option<String>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

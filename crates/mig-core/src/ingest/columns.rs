//! Header recognition for the tabular export.
//!
//! The export's headers vary by source: the warehouse view uses display
//! headers (`PRCS AREA CODE`, `Dev Group Name`), older extracts use the
//! canonical snake_case names. Recognition is declarative and tolerant of
//! case, surrounding whitespace, and separator style; unrecognized columns
//! are carried through on the row untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Roles a recognized column plays in the pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Project,
    DevGrpName,
    DevGrpNum,
    StatusRaw,
    StatusNameRaw,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 5] = [
        ColumnRole::Project,
        ColumnRole::DevGrpName,
        ColumnRole::DevGrpNum,
        ColumnRole::StatusRaw,
        ColumnRole::StatusNameRaw,
    ];

    /// Canonical field name for reports and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnRole::Project => "project",
            ColumnRole::DevGrpName => "dev_grp_name",
            ColumnRole::DevGrpNum => "dev_grp_num",
            ColumnRole::StatusRaw => "status",
            ColumnRole::StatusNameRaw => "status_name",
        }
    }

    /// Whether absence of this column marks the input incomplete.
    ///
    /// The group-number column is a sentinel carrier, not a rollup
    /// dimension, so extracts without it are still complete.
    pub fn expected(self) -> bool {
        !matches!(self, ColumnRole::DevGrpNum)
    }
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognize a header cell.
pub fn role_for_header(header: &str) -> Option<ColumnRole> {
    match normalize_header(header).as_str() {
        "prcs area code" | "project" => Some(ColumnRole::Project),
        "dev group name" | "dev grp name" => Some(ColumnRole::DevGrpName),
        "dev group num" | "dev grp num" | "dev group number" => Some(ColumnRole::DevGrpNum),
        "status" => Some(ColumnRole::StatusRaw),
        "status name" => Some(ColumnRole::StatusNameRaw),
        _ => None,
    }
}

/// Lower-cased, trimmed, with `_`/`-`/whitespace runs collapsed to single
/// spaces, so `Dev Group Name`, `dev_grp_name`, and `DEV-GRP-NAME` compare
/// under one spelling.
fn normalize_header(header: &str) -> String {
    header
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Role → column index mapping for one header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indices: BTreeMap<ColumnRole, usize>,
}

impl ColumnMap {
    /// Map a header row. On duplicate headers for one role, the first wins.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut indices = BTreeMap::new();
        for (idx, header) in headers.into_iter().enumerate() {
            if let Some(role) = role_for_header(header) {
                indices.entry(role).or_insert(idx);
            }
        }
        Self { indices }
    }

    pub fn index_of(&self, role: ColumnRole) -> Option<usize> {
        self.indices.get(&role).copied()
    }

    pub fn contains(&self, role: ColumnRole) -> bool {
        self.indices.contains_key(&role)
    }

    /// Expected roles with no column in the header row.
    pub fn missing_expected(&self) -> Vec<ColumnRole> {
        ColumnRole::ALL
            .into_iter()
            .filter(|role| role.expected() && !self.contains(*role))
            .collect()
    }
}

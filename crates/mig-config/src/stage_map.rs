//! Stage-map configuration types.
//!
//! The stage map is the pipeline's only tunable surface: which lower-cased
//! status codes set which completion flag, which literals count as "no
//! status supplied", which statuses exclude a row outright, and which
//! dev-group sentinels are dropped at normalization time. It is data, not
//! logic — derivation code never branches on specific status spellings.
//!
//! # Fatal validation
//!
//! Two flags claiming the same status code would break the at-most-one-done
//! -flag row invariant the aggregation layer depends on, so overlap is a
//! startup failure, never a silent merge.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Flag identifiers — the fixed columns of the Flag Vector, in schema order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum StageFlag {
    SpecDone,
    EtlDone,
    QaDone,
    AccDone,
    ProdDone,
    SpecInPgrs,
    EtlInPgrs,
    QaInPgrs,
}

impl StageFlag {
    /// All flags in schema order.
    pub const ALL: [StageFlag; 8] = [
        StageFlag::SpecDone,
        StageFlag::EtlDone,
        StageFlag::QaDone,
        StageFlag::AccDone,
        StageFlag::ProdDone,
        StageFlag::SpecInPgrs,
        StageFlag::EtlInPgrs,
        StageFlag::QaInPgrs,
    ];

    /// The five stage-completion flags.
    pub const DONE: [StageFlag; 5] = [
        StageFlag::SpecDone,
        StageFlag::EtlDone,
        StageFlag::QaDone,
        StageFlag::AccDone,
        StageFlag::ProdDone,
    ];

    /// Legacy in-progress placeholders, retained for schema compatibility
    /// with older consumers. Always zero: the map must give them no codes.
    pub fn is_legacy(self) -> bool {
        matches!(
            self,
            StageFlag::SpecInPgrs | StageFlag::EtlInPgrs | StageFlag::QaInPgrs
        )
    }

    /// The serialized column name for this flag.
    pub fn as_str(self) -> &'static str {
        match self {
            StageFlag::SpecDone => "spec_done",
            StageFlag::EtlDone => "etl_done",
            StageFlag::QaDone => "qa_done",
            StageFlag::AccDone => "acc_done",
            StageFlag::ProdDone => "prod_done",
            StageFlag::SpecInPgrs => "spec_in_pgrs",
            StageFlag::EtlInPgrs => "etl_in_pgrs",
            StageFlag::QaInPgrs => "qa_in_pgrs",
        }
    }
}

impl std::fmt::Display for StageFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from stage-map loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum StageMapError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid stage map JSON: {0}")]
    Parse(String),

    #[error("stage map omits flag {0}")]
    MissingFlag(StageFlag),

    #[error("status code {code:?} claimed by both {flag_a} and {flag_b}")]
    Overlap {
        flag_a: StageFlag,
        flag_b: StageFlag,
        code: String,
    },

    #[error("done flag {0} has no accepted status codes")]
    EmptyDoneSet(StageFlag),

    #[error("legacy flag {flag} must map to the empty set, got {codes:?}")]
    LegacyNotEmpty { flag: StageFlag, codes: Vec<String> },

    #[error("status code {code:?} under {flag} must be lower-cased, trimmed, and non-empty")]
    MalformedCode { flag: StageFlag, code: String },

    #[error("literal {0:?} must be lower-cased, trimmed, and non-empty")]
    MalformedLiteral(String),

    #[error("pending_status must be non-empty")]
    EmptyPendingStatus,
}

impl From<StageMapError> for mig_common::Error {
    fn from(err: StageMapError) -> Self {
        match err {
            StageMapError::Overlap {
                flag_a,
                flag_b,
                code,
            } => mig_common::Error::OverlappingFlagCodes {
                flag_a: flag_a.to_string(),
                flag_b: flag_b.to_string(),
                code,
            },
            other => mig_common::Error::InvalidStageMap(other.to_string()),
        }
    }
}

/// Complete stage-map configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StageMap {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Flag → accepted status codes (lower-cased match keys).
    pub flags: BTreeMap<StageFlag, BTreeSet<String>>,

    /// Literals (matched case-insensitively) treated as "no status supplied".
    #[serde(default = "default_null_literals")]
    pub null_literals: BTreeSet<String>,

    /// Lower-cased statuses whose rows are removed from the pipeline
    /// entirely ("Conversion Not Needed").
    #[serde(default = "default_excluded_statuses")]
    pub excluded_statuses: BTreeSet<String>,

    /// Canonical status assigned to rows with no usable status value.
    #[serde(default = "default_pending_status")]
    pub pending_status: String,

    /// dev_grp_num sentinels excluded at normalization time, when the
    /// column is present. Rows with a missing dev_grp_num are never
    /// dropped on this rule.
    #[serde(default = "default_excluded_group_nums")]
    pub excluded_group_nums: BTreeSet<i64>,
}

fn default_null_literals() -> BTreeSet<String> {
    ["nan", "none"].into_iter().map(String::from).collect()
}

fn default_excluded_statuses() -> BTreeSet<String> {
    ["cnn"].into_iter().map(String::from).collect()
}

fn default_pending_status() -> String {
    "PEND".to_string()
}

fn default_excluded_group_nums() -> BTreeSet<i64> {
    [99].into_iter().collect()
}

/// Embedded default stage map JSON for fallback.
const DEFAULT_STAGE_MAP_JSON: &str = include_str!("schemas/stage_map.default.json");

impl Default for StageMap {
    fn default() -> Self {
        // Parse the embedded default stage map JSON.
        // This should never fail since the JSON is embedded at compile time.
        Self::parse_json(DEFAULT_STAGE_MAP_JSON).expect("embedded default stage map is invalid")
    }
}

impl StageMap {
    /// Load and validate a stage map from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, StageMapError> {
        let content = std::fs::read_to_string(path).map_err(|e| StageMapError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let map = Self::parse_json(&content)?;
        map.validate()?;
        Ok(map)
    }

    /// Parse a stage map from a JSON string without validating.
    pub fn parse_json(json: &str) -> Result<Self, StageMapError> {
        serde_json::from_str(json).map_err(|e| StageMapError::Parse(e.to_string()))
    }

    /// Semantic validation. Overlapping flag→code claims are fatal; so are
    /// missing flags, codes that are not lower-cased match keys, done flags
    /// with no codes, and legacy flags with any.
    pub fn validate(&self) -> Result<(), StageMapError> {
        if self.pending_status.trim().is_empty() {
            return Err(StageMapError::EmptyPendingStatus);
        }

        for flag in StageFlag::ALL {
            let codes = self
                .flags
                .get(&flag)
                .ok_or(StageMapError::MissingFlag(flag))?;

            if flag.is_legacy() {
                if !codes.is_empty() {
                    return Err(StageMapError::LegacyNotEmpty {
                        flag,
                        codes: codes.iter().cloned().collect(),
                    });
                }
            } else if codes.is_empty() {
                return Err(StageMapError::EmptyDoneSet(flag));
            }

            for code in codes {
                if !is_match_key(code) {
                    return Err(StageMapError::MalformedCode {
                        flag,
                        code: code.clone(),
                    });
                }
            }
        }

        // Disjointness: each code belongs to at most one flag.
        let mut claimed: BTreeMap<&str, StageFlag> = BTreeMap::new();
        for flag in StageFlag::ALL {
            for code in &self.flags[&flag] {
                if let Some(prior) = claimed.insert(code.as_str(), flag) {
                    return Err(StageMapError::Overlap {
                        flag_a: prior,
                        flag_b: flag,
                        code: code.clone(),
                    });
                }
            }
        }

        for lit in &self.null_literals {
            if !is_match_key(lit) {
                return Err(StageMapError::MalformedLiteral(lit.clone()));
            }
        }
        for status in &self.excluded_statuses {
            if !is_match_key(status) {
                return Err(StageMapError::MalformedLiteral(status.clone()));
            }
        }

        Ok(())
    }

    /// Whether a raw status value is a null-like literal (case-insensitive).
    pub fn is_null_literal(&self, value: &str) -> bool {
        self.null_literals.contains(value.to_lowercase().as_str())
    }

    /// Whether a lower-cased match key names an excluded status.
    pub fn is_excluded_status(&self, key: &str) -> bool {
        self.excluded_statuses.contains(key)
    }

    /// Whether a dev-group number is an excluded sentinel.
    pub fn is_excluded_group_num(&self, num: i64) -> bool {
        self.excluded_group_nums.contains(&num)
    }

    /// The unique flag claiming a lower-cased match key, if any.
    ///
    /// Uniqueness holds by the disjointness validated at load.
    pub fn flag_for(&self, key: &str) -> Option<StageFlag> {
        StageFlag::ALL
            .into_iter()
            .find(|flag| self.flags.get(flag).is_some_and(|codes| codes.contains(key)))
    }

    /// Accepted codes for a flag (empty for legacy flags).
    pub fn codes(&self, flag: StageFlag) -> Option<&BTreeSet<String>> {
        self.flags.get(&flag)
    }
}

/// A usable match key: non-empty, trimmed, and already lower-cased.
fn is_match_key(s: &str) -> bool {
    !s.is_empty() && s.trim() == s && s.to_lowercase() == s
}

/// Generate the JSON schema for stage-map files.
pub fn stage_map_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(StageMap);
    serde_json::to_value(schema).expect("stage map schema should serialize")
}

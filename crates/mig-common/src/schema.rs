//! Schema versioning for serialized rollup outputs.

/// Current schema version for all JSON outputs (snapshots, receipts).
///
/// Follows semver: MAJOR.MINOR.PATCH
/// - MAJOR: Breaking changes (field removals, flag renames)
/// - MINOR: Additive changes (new optional fields)
/// - PATCH: Bug fixes, documentation
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Check if a schema version is compatible with current.
///
/// Compatibility is major-version equality; minor/patch differences are
/// additive by contract.
pub fn is_compatible(version: &str) -> bool {
    major_of(version) == major_of(SCHEMA_VERSION)
}

fn major_of(version: &str) -> u32 {
    version
        .split('.')
        .next()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0)
}

//! Stage-map file resolution.
//!
//! Resolution order: explicit path, then `MIG_ROLLUP_CONFIG`, then the
//! platform config directory, then the embedded default. A file that exists
//! but fails to parse or validate is an error at every step — a broken map
//! never silently falls through to the default.

use crate::stage_map::{StageMap, StageMapError};
use std::path::{Path, PathBuf};

/// Environment variable overriding the stage-map location.
pub const CONFIG_ENV_VAR: &str = "MIG_ROLLUP_CONFIG";

const DIR_NAME: &str = "migration_rollup";
const FILE_NAME: &str = "stage_map.json";

/// The platform-default stage-map path, if a config directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    // XDG_CONFIG_HOME wins over the platform default when set.
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Some(PathBuf::from(xdg).join(DIR_NAME).join(FILE_NAME));
        }
    }
    dirs::config_dir().map(|base| base.join(DIR_NAME).join(FILE_NAME))
}

/// Resolve and load the stage map.
///
/// `explicit` comes from the command line; passing a path that does not
/// exist is an error. Lower-priority locations are only consulted when the
/// higher one is absent.
pub fn resolve_stage_map(explicit: Option<&Path>) -> Result<StageMap, StageMapError> {
    // 1) Explicit override
    if let Some(path) = explicit {
        return StageMap::from_file(path);
    }

    // 2) Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return StageMap::from_file(Path::new(&path));
        }
    }

    // 3) Platform config directory, when the file exists
    if let Some(path) = default_config_path() {
        if path.exists() {
            return StageMap::from_file(&path);
        }
    }

    // 4) Embedded default
    let map = StageMap::default();
    map.validate()?;
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_map(dir: &TempDir, name: &str, json: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(json.as_bytes()).unwrap();
        path
    }

    fn minimal_map_json(qa_code: &str) -> String {
        format!(
            r#"{{
                "schema_version": "1.0.0",
                "flags": {{
                    "spec_done": ["spec"],
                    "etl_done": ["etl"],
                    "qa_done": ["{qa_code}"],
                    "acc_done": ["acc"],
                    "prod_done": ["prod"],
                    "spec_in_pgrs": [],
                    "etl_in_pgrs": [],
                    "qa_in_pgrs": []
                }}
            }}"#
        )
    }

    #[test]
    fn explicit_path_loads() {
        let tmp = TempDir::new().unwrap();
        let path = write_map(&tmp, "map.json", &minimal_map_json("ready"));
        let map = resolve_stage_map(Some(&path)).unwrap();
        assert!(map.codes(crate::StageFlag::QaDone).unwrap().contains("ready"));
    }

    #[test]
    fn explicit_missing_path_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.json");
        assert!(matches!(
            resolve_stage_map(Some(&path)).unwrap_err(),
            StageMapError::Io { .. }
        ));
    }

    #[test]
    fn explicit_invalid_map_does_not_fall_through() {
        let tmp = TempDir::new().unwrap();
        let path = write_map(&tmp, "bad.json", "{\"schema_version\": \"1.0.0\"}");
        assert!(resolve_stage_map(Some(&path)).is_err());
    }

    #[test]
    fn no_overrides_yields_embedded_default() {
        // The default map is always a valid last resort.
        let map = StageMap::default();
        assert!(map.validate().is_ok());
        assert!(map.is_excluded_status("cnn"));
    }

    #[test]
    fn default_path_ends_with_expected_components() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("migration_rollup/stage_map.json"));
        }
    }
}

//! # Configuration State
//!
//! Stores chart configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`DENTALAB_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use dentalab_core::TEETH_SELECTION_STORAGE_KEY;

/// File name of the chart database inside the platform data directory.
const DATABASE_FILE_NAME: &str = "chart.db";

/// Chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    /// Explicit database file. `None` means the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Slot key the selection snapshot is stored under.
    /// Default: "teeth-selection-storage"
    pub storage_key: String,

    /// Whether selection changes are written to the database at all.
    /// Default: true
    pub persist: bool,

    /// Reject tooth numbers outside Universal numbering
    /// (maxillary 1-16, mandibular 17-32).
    /// Default: false
    pub strict_tooth_numbers: bool,

    /// Run overlap cleanup right after the persisted snapshot is merged.
    /// Default: false
    pub cleanup_on_load: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            database_path: None,
            storage_key: TEETH_SELECTION_STORAGE_KEY.to_string(),
            persist: true,
            strict_tooth_numbers: false,
            cleanup_on_load: false,
        }
    }
}

impl ChartConfig {
    /// Creates a ChartConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `DENTALAB_DB_PATH`: Database file path
    /// - `DENTALAB_STORAGE_KEY`: Override the slot key
    /// - `DENTALAB_PERSIST`: `0`/`false` disables persistence
    /// - `DENTALAB_STRICT_TOOTH_NUMBERS`: `1`/`true` enables range checks
    /// - `DENTALAB_CLEANUP_ON_LOAD`: `1`/`true` resolves overlaps at startup
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ChartConfig::default();

        if let Some(path) = lookup("DENTALAB_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(key) = lookup("DENTALAB_STORAGE_KEY").filter(|k| !k.trim().is_empty()) {
            config.storage_key = key;
        }

        if let Some(flag) = read_flag(&lookup, "DENTALAB_PERSIST") {
            config.persist = flag;
        }

        if let Some(flag) = read_flag(&lookup, "DENTALAB_STRICT_TOOTH_NUMBERS") {
            config.strict_tooth_numbers = flag;
        }

        if let Some(flag) = read_flag(&lookup, "DENTALAB_CLEANUP_ON_LOAD") {
            config.cleanup_on_load = flag;
        }

        config
    }

    /// Resolves where the chart database lives.
    ///
    /// ## Platform-specific Paths (default)
    /// - Linux: `~/.local/share/chart/chart.db`
    /// - macOS: `~/Library/Application Support/com.dentalab.chart/chart.db`
    /// - Windows: `C:\Users\<User>\AppData\Roaming\dentalab\chart\data\chart.db`
    ///
    /// Falls back to `./chart.db` when no home directory is known.
    pub fn resolve_database_path(&self) -> PathBuf {
        if let Some(path) = &self.database_path {
            return path.clone();
        }

        match ProjectDirs::from("com", "dentalab", "chart") {
            Some(dirs) => {
                let data_dir = dirs.data_dir();
                if let Err(e) = std::fs::create_dir_all(data_dir) {
                    warn!(path = %data_dir.display(), "Failed to create data directory: {}", e);
                }
                data_dir.join(DATABASE_FILE_NAME)
            }
            None => PathBuf::from(DATABASE_FILE_NAME),
        }
    }
}

fn read_flag(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<bool> {
    let raw = lookup(name)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => {
            warn!(variable = name, value = other, "Ignoring unrecognised flag value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ChartConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ChartConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, ChartConfig::default());
        assert_eq!(config.storage_key, "teeth-selection-storage");
        assert!(config.persist);
        assert!(!config.strict_tooth_numbers);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DENTALAB_DB_PATH", "/tmp/lab.db"),
            ("DENTALAB_STORAGE_KEY", "case-42"),
            ("DENTALAB_PERSIST", "false"),
            ("DENTALAB_STRICT_TOOTH_NUMBERS", "1"),
            ("DENTALAB_CLEANUP_ON_LOAD", "yes"),
        ]);

        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/lab.db")));
        assert_eq!(config.storage_key, "case-42");
        assert!(!config.persist);
        assert!(config.strict_tooth_numbers);
        assert!(config.cleanup_on_load);
    }

    #[test]
    fn test_bad_flag_keeps_default() {
        let config = config_from(&[("DENTALAB_PERSIST", "maybe"), ("DENTALAB_STORAGE_KEY", "  ")]);
        assert!(config.persist);
        assert_eq!(config.storage_key, "teeth-selection-storage");
    }

    #[test]
    fn test_explicit_path_wins() {
        let config = config_from(&[("DENTALAB_DB_PATH", "/tmp/lab.db")]);
        assert_eq!(config.resolve_database_path(), PathBuf::from("/tmp/lab.db"));
    }
}

//! Configuration with layered hierarchy
//!
//! Priority order: built-in defaults, then `npi.yaml` in the working
//! directory, then `NPI_*` environment variables. Every layer is optional;
//! unreadable or malformed layers are skipped silently so a broken config
//! never blocks a lookup.

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::resolver::BackfillPolicy;

/// Config file searched for in the working directory
pub const CONFIG_FILE: &str = "npi.yaml";

const DEFAULT_DB_FILE: &str = "npi_projects.db";
const DEFAULT_WORKBOOK_FILE: &str = "NPI_Project_Data.xlsx";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database path
    pub db_file: Option<PathBuf>,

    /// Fallback workbook path
    pub workbook_file: Option<PathBuf>,

    /// Whether workbook hits are written back into the database
    pub backfill: Option<bool>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (applied by the accessors)

        // 2. npi.yaml in the working directory
        let file = PathBuf::from(CONFIG_FILE);
        if file.exists() {
            if let Ok(contents) = std::fs::read_to_string(&file) {
                if let Ok(from_file) = serde_yml::from_str::<Config>(&contents) {
                    config.merge(from_file);
                }
            }
        }

        // 3. Environment variables
        if let Ok(db) = std::env::var("NPI_DB_FILE") {
            config.db_file = Some(PathBuf::from(db));
        }
        if let Ok(workbook) = std::env::var("NPI_WORKBOOK_FILE") {
            config.workbook_file = Some(PathBuf::from(workbook));
        }
        if let Ok(backfill) = std::env::var("NPI_BACKFILL") {
            config.backfill = Some(matches!(
                backfill.to_lowercase().as_str(),
                "1" | "true" | "yes"
            ));
        }

        config
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.db_file.is_some() {
            self.db_file = other.db_file;
        }
        if other.workbook_file.is_some() {
            self.workbook_file = other.workbook_file;
        }
        if other.backfill.is_some() {
            self.backfill = other.backfill;
        }
    }

    pub fn db_file(&self) -> PathBuf {
        self.db_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
    }

    pub fn workbook_file(&self) -> PathBuf {
        self.workbook_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK_FILE))
    }

    pub fn backfill_policy(&self) -> BackfillPolicy {
        if self.backfill.unwrap_or(true) {
            BackfillPolicy::Always
        } else {
            BackfillPolicy::Never
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.db_file(), PathBuf::from(DEFAULT_DB_FILE));
        assert_eq!(config.workbook_file(), PathBuf::from(DEFAULT_WORKBOOK_FILE));
        assert_eq!(config.backfill_policy(), BackfillPolicy::Always);
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config::default();
        let layer: Config = serde_yml::from_str(
            "db_file: /tmp/other.db\nbackfill: false\n",
        )
        .unwrap();
        base.merge(layer);

        assert_eq!(base.db_file(), PathBuf::from("/tmp/other.db"));
        assert_eq!(base.workbook_file(), PathBuf::from(DEFAULT_WORKBOOK_FILE));
        assert_eq!(base.backfill_policy(), BackfillPolicy::Never);
    }
}

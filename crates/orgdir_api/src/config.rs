//! Environment-driven configuration for directory front ends.
//!
//! # Invariants
//! - Blank environment values are treated as unset.

use orgdir_core::{default_log_level, LoggingConfig, LoggingError};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "ORGDIR_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "ORGDIR_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "ORGDIR_LOG_DIR";
const DEFAULT_DB_FILE_NAME: &str = "orgdir.sqlite3";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ApiConfig {
    /// Reads `ORGDIR_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();
        Self {
            db_path: read(DB_PATH_ENV).map_or(defaults.db_path, PathBuf::from),
            log_level: read(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    /// Builds the core logging config, or `None` when no directory is set.
    pub fn logging_config(&self) -> Result<Option<LoggingConfig>, LoggingError> {
        self.log_dir
            .as_ref()
            .map(|dir| LoggingConfig::new(&self.log_level, dir))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ApiConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, ApiConfig::default());
        assert!(config.db_path.ends_with("orgdir.sqlite3"));
        assert_eq!(config.logging_config().unwrap(), None);
    }

    #[test]
    fn explicit_values_override_defaults_and_blanks_are_ignored() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, " /srv/orgdir/directory.sqlite3 "),
            (LOG_LEVEL_ENV, "   "),
            (LOG_DIR_ENV, "/var/log/orgdir"),
        ]));

        assert_eq!(config.db_path, PathBuf::from("/srv/orgdir/directory.sqlite3"));
        assert_eq!(config.log_level, ApiConfig::default().log_level);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/orgdir")));
    }

    #[test]
    fn logging_config_rejects_relative_directory() {
        let config = ApiConfig::from_lookup(lookup_from(&[(LOG_DIR_ENV, "logs")]));
        assert!(config.logging_config().is_err());
    }
}

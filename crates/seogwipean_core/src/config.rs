//! Environment-driven runtime configuration.
//!
//! | Variable                | Default                               |
//! |-------------------------|---------------------------------------|
//! | `SEOGWIPEAN_DB_PATH`    | `<temp_dir>/seogwipean.sqlite3`       |
//! | `SEOGWIPEAN_LOG_LEVEL`  | [`default_log_level`]                 |
//! | `SEOGWIPEAN_LOG_DIR`    | unset (file logging disabled)         |
//!
//! Blank values are treated as unset.

use crate::db::SqliteConnectionFactory;
use crate::logging::{default_log_level, init_logging};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "SEOGWIPEAN_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "SEOGWIPEAN_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "SEOGWIPEAN_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "seogwipean.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: non_blank(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: non_blank(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: non_blank(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    pub fn connection_factory(&self) -> SqliteConnectionFactory {
        SqliteConnectionFactory::new(self.db_path.clone())
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` when logging stays disabled.
    pub fn init_logging(&self) -> Result<bool, String> {
        let Some(log_dir) = self.log_dir.as_ref() else {
            return Ok(false);
        };
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log_dir is not valid UTF-8: `{}`", log_dir.display()))?;
        init_logging(&self.log_level, log_dir)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> CoreConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CoreConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let config = config_from(&[(DB_PATH_ENV, "   "), (LOG_LEVEL_ENV, "")]);
        assert_eq!(
            config.db_path,
            std::env::temp_dir().join("seogwipean.sqlite3")
        );
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_are_trimmed() {
        let config = config_from(&[
            (DB_PATH_ENV, " /srv/hotel/data.sqlite3 "),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "/var/log/hotel"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/srv/hotel/data.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/hotel")));
        assert_eq!(
            config.connection_factory().path(),
            PathBuf::from("/srv/hotel/data.sqlite3").as_path()
        );
    }

    #[test]
    fn logging_stays_disabled_without_log_dir() {
        let config = config_from(&[]);
        assert_eq!(config.init_logging(), Ok(false));
    }
}

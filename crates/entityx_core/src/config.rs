//! Runtime configuration for the access layer and its ambient services.
//!
//! # Responsibility
//! - Describe where the store lives and how the connection is tuned.
//! - Carry logging and paging defaults consumed by bootstrap code.
//!
//! # Invariants
//! - `CoreConfig::default()` never touches the filesystem.
//! - `ENTITYX_*` variables override defaults; values that fail to
//!   deserialize or validate are rejected, not ignored.

use crate::logging::default_log_level;
use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Prefix of every environment override, e.g. `ENTITYX_DB_PATH`.
pub const ENV_PREFIX: &str = "ENTITYX_";

/// Page size used when a caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug)]
pub enum ConfigError {
    /// A source could not be read or a value has the wrong type.
    Extract(Box<figment::Error>),
    /// A value deserialized but is out of range.
    Invalid { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extract(err) => write!(f, "failed to load config: {err}"),
            Self::Invalid { key, value } => write!(f, "invalid value `{value}` for `{key}`"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Extract(err) => Some(err.as_ref()),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Extract(Box::new(value))
    }
}

/// Store and logging settings.
///
/// Field names double as environment keys: `page_size` is read from
/// `ENTITYX_PAGE_SIZE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// SQLite file path. `None` opens an in-memory store.
    pub db_path: Option<PathBuf>,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout_ms: u64,
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Page size used when a caller does not supply one.
    pub page_size: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            log_level: default_log_level().to_string(),
            log_dir: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by `ENTITYX_*` environment variables.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads and validates [`CoreConfig::figment`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Extracts from any figment, so callers can layer extra providers.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "page_size",
                value: self.page_size.to_string(),
            });
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "log_level",
                value: self.log_level.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use figment::providers::Serialized;
    use figment::Jail;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn defaults_describe_in_memory_store() {
        let config = CoreConfig::default();
        assert!(config.db_path.is_none());
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn environment_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("ENTITYX_DB_PATH", "/tmp/entityx.db");
            jail.set_env("ENTITYX_BUSY_TIMEOUT_MS", "250");
            jail.set_env("ENTITYX_PAGE_SIZE", "25");

            let config = CoreConfig::from_env().unwrap();
            assert_eq!(config.db_path, Some(PathBuf::from("/tmp/entityx.db")));
            assert_eq!(config.busy_timeout(), Duration::from_millis(250));
            assert_eq!(config.page_size, 25);
            assert!(config.log_dir.is_none());
            Ok(())
        });
    }

    #[test]
    fn unset_environment_yields_defaults() {
        Jail::expect_with(|_| {
            assert_eq!(CoreConfig::from_env().unwrap(), CoreConfig::default());
            Ok(())
        });
    }

    #[test]
    fn malformed_number_is_an_extract_error() {
        Jail::expect_with(|jail| {
            jail.set_env("ENTITYX_BUSY_TIMEOUT_MS", "soon");

            let err = CoreConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::Extract(_)));
            Ok(())
        });
    }

    #[test]
    fn zero_page_size_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("ENTITYX_PAGE_SIZE", "0");

            let err = CoreConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "page_size", .. }));
            Ok(())
        });
    }

    #[test]
    fn extra_providers_layer_over_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("ENTITYX_LOG_LEVEL", "warn");
            let figment = CoreConfig::figment().merge(Serialized::default("log_level", "error"));

            let config = CoreConfig::from_figment(&figment).unwrap();
            assert_eq!(config.log_level, "error");
            Ok(())
        });
    }
}

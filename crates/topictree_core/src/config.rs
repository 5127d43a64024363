//! Engine configuration.
//!
//! # Responsibility
//! - Describe tunables shared by the library and the CLI.
//! - Load them from JSON files with strict field checking.
//!
//! # Invariants
//! - Missing fields take defaults; unknown fields are rejected.
//! - `max_ancestry_depth` is at least 1.

use crate::model::topic::{TopicId, ROOT_TOPIC_ID};
use crate::service::ancestry::DEFAULT_MAX_ANCESTRY_DEPTH;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Errors from loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config text is not valid JSON for [`EngineConfig`].
    Parse(serde_json::Error),
    /// Config decoded but holds an unusable value.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Logging section of [`EngineConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `trace|debug|info|warn|error`; build-mode default when absent.
    pub level: Option<String>,
    /// Absolute directory for rotating log files; stderr when absent.
    pub log_dir: Option<PathBuf>,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Topic every parsed subject chain hangs under.
    pub root_topic_id: TopicId,
    /// Upper bound on ancestry chain length for read paths.
    pub max_ancestry_depth: usize,
    /// SQLite file; callers fall back to an in-memory database when absent.
    pub database_path: Option<PathBuf>,
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root_topic_id: ROOT_TOPIC_ID,
            max_ancestry_depth: DEFAULT_MAX_ANCESTRY_DEPTH,
            database_path: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Decodes configuration JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and decodes a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ancestry_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_ancestry_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EngineConfig};
    use crate::model::topic::ROOT_TOPIC_ID;
    use std::path::PathBuf;

    #[test]
    fn empty_object_yields_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.root_topic_id, ROOT_TOPIC_ID);
        assert_eq!(config.max_ancestry_depth, 100);
    }

    #[test]
    fn partial_config_overrides_named_fields() {
        let config = EngineConfig::from_json_str(
            r#"{"database_path":"/tmp/topics.sqlite3","logging":{"level":"warn"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.database_path,
            Some(PathBuf::from("/tmp/topics.sqlite3"))
        );
        assert_eq!(config.logging.level.as_deref(), Some("warn"));
        assert_eq!(config.logging.log_dir, None);
    }

    #[test]
    fn unknown_fields_and_zero_depth_are_rejected() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"rootTopic":"x"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"max_ancestry_depth":0}"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}

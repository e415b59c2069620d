//! Process configuration loaded from an optional TOML file.
//!
//! # Invariants
//! - A missing config file is not an error; defaults apply.
//! - Relative paths in a config file resolve against that file's directory.
//! - Unknown keys are rejected so typos surface early.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default SQLite file name when no `db_path` is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "orgspace.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrgspaceConfig {
    /// SQLite file holding the persisted entity record.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. Logging is off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for OrgspaceConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Loads configuration from `path`, or defaults when the file is absent.
pub fn load_config(path: impl AsRef<Path>) -> Result<OrgspaceConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(OrgspaceConfig::default());
    }

    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_config(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(base) = path.parent() {
        config.db_path = resolve(base, &config.db_path);
        config.log_dir = config.log_dir.map(|dir| resolve(base, &dir));
    }
    Ok(config)
}

/// Parses TOML config text without any path resolution.
pub fn parse_config(text: &str) -> Result<OrgspaceConfig, toml::de::Error> {
    toml::from_str(text)
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{load_config, parse_config, OrgspaceConfig, DEFAULT_DB_FILE_NAME};
    use std::path::PathBuf;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, OrgspaceConfig::default());
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE_NAME));
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orgspace.toml");
        std::fs::write(&path, "db_path = \"data/org.sqlite3\"\nlog_level = \"warn\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.db_path, dir.path().join("data/org.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_config("db_pth = \"x\"").is_err());
    }
}

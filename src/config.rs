//! Client configuration loading.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridge;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Override for the backend socket path; unset means the default
    /// per-user location.
    pub socket: Option<PathBuf>,
    pub logging: LoggingConfig,
}

impl Config {
    /// Resolved backend socket path.
    pub fn socket_path(&self) -> PathBuf {
        self.socket.clone().unwrap_or_else(bridge::socket_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbosity: u8,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            verbosity: 1,
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

/// `$XDG_CONFIG_HOME/boreal/config.toml`, with the usual home fallback.
pub fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".config")
        })
        .join("boreal")
        .join("config.toml")
}

/// Load the config file if present; a missing file yields defaults.
pub fn load() -> Result<Config, ConfigError> {
    load_from(config_path())
}

fn load_from(path: PathBuf) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

/// Load, falling back to defaults on any failure, then apply environment
/// overrides. This is what the shell calls at startup.
pub fn load_or_default() -> Config {
    let mut config = match load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("config load failed, using defaults: {err}");
            Config::default()
        }
    };
    apply_env_overrides(&mut config);
    config
}

/// `BOREAL_SOCKET` and `BOREAL_LOG_FORMAT` override the file.
pub fn apply_env_overrides(config: &mut Config) {
    if let Ok(path) = std::env::var("BOREAL_SOCKET") {
        if !path.trim().is_empty() {
            config.socket = Some(PathBuf::from(path));
        }
    }
    if let Ok(format) = std::env::var("BOREAL_LOG_FORMAT") {
        match format.as_str() {
            "pretty" => config.logging.format = LogFormat::Pretty,
            "compact" => config.logging.format = LogFormat::Compact,
            "json" => config.logging.format = LogFormat::Json,
            other => tracing::warn!("unknown BOREAL_LOG_FORMAT {other:?}, keeping config value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_from(dir.path().join("config.toml")).expect("defaults");
        assert!(config.socket.is_none());
        assert_eq!(config.logging.verbosity, 1);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn file_values_are_parsed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).expect("create");
        writeln!(
            file,
            "socket = \"/run/boreal/backend.sock\"\n\n[logging]\nverbosity = 2\nformat = \"json\""
        )
        .expect("write");

        let config = load_from(path).expect("parsed");
        assert_eq!(
            config.socket.as_deref(),
            Some(std::path::Path::new("/run/boreal/backend.sock"))
        );
        assert_eq!(config.logging.verbosity, 2);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_failure_is_reported_with_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "socket = [not toml").expect("write");

        let err = load_from(path.clone()).expect_err("parse error");
        assert!(err.to_string().contains("config.toml"));
    }
}

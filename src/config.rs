//! Client configuration.
//!
//! Layered as: built-in defaults, then `iwm.toml` (or the file named by
//! `--config` / `IWM_CONFIG`), then `IWM_*` environment variables, then
//! command-line flags (applied by `main`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "IWM_CONFIG";
pub const API_URL_ENV: &str = "IWM_API_URL";
pub const FACTORY_CODE_ENV: &str = "IWM_FACTORY_CODE";
pub const TIMEOUT_ENV: &str = "IWM_HTTP_TIMEOUT_SECS";

const DEFAULT_CONFIG_FILE: &str = "iwm.toml";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Terminal client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the JSON API (e.g. "http://10.164.222.93:3000").
    pub api_base_url: String,

    /// Factory the terminal operates for.
    pub factory_code: String,

    /// Legacy web service endpoint, kept in the session for display.
    pub web_service_url: String,

    /// Whether `web_service_url` points at production.
    pub is_real_url: bool,

    /// Address reported for this device, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_ip: Option<String>,

    pub request_timeout_secs: u64,

    pub connect_timeout_secs: u64,

    /// Build label shown on the login screen.
    pub build_label: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://10.164.222.93:3000".to_string(),
            factory_code: "001".to_string(),
            web_service_url: "https://mespdamobile.condor.dz/WINCEWeb.asmx".to_string(),
            is_real_url: true,
            device_ip: None,
            request_timeout_secs: 10,
            connect_timeout_secs: 3,
            build_label: "V25.08.18".to_string(),
        }
    }
}

impl ClientConfig {
    /// Path of the config file: `IWM_CONFIG` if set, otherwise `./iwm.toml`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load config from disk, or return defaults if the file doesn't exist.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `IWM_*` overrides from the process environment.
    ///
    /// # Errors
    /// Returns error if an override cannot be parsed.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns error if an override cannot be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV) {
            self.api_base_url = url;
        }
        if let Some(code) = lookup(FACTORY_CODE_ENV) {
            self.factory_code = code;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            self.request_timeout_secs =
                raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    key: TIMEOUT_ENV,
                    reason: format!("expected seconds, got {raw:?}"),
                })?;
        }
        Ok(())
    }

    /// Check the values are usable.
    ///
    /// # Errors
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid {
                key: "api_base_url",
                reason: format!("must start with http:// or https://, got {:?}", self.api_base_url),
            });
        }
        if self.factory_code.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "factory_code",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "connect_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    /// Host part of the web service URL, for the login banner.
    #[must_use]
    pub fn server_host(&self) -> &str {
        let rest = self
            .web_service_url
            .split_once("://")
            .map_or(self.web_service_url.as_str(), |(_, rest)| rest);
        rest.split('/').next().unwrap_or(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ClientConfig::load(&dir.path().join("absent.toml")).expect("Should load");
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "api_base_url = \"http://127.0.0.1:3000\"").expect("write");
        writeln!(file, "device_ip = \"10.1.2.3\"").expect("write");

        let config = ClientConfig::load(file.path()).expect("Should load");
        assert_eq!(config.api_base_url, "http://127.0.0.1:3000");
        assert_eq!(config.device_ip.as_deref(), Some("10.1.2.3"));
        assert_eq!(config.factory_code, "001");
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "request_timeout_secs = \"soon\"").expect("write");

        let err = ClientConfig::load(file.path()).expect_err("Should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (API_URL_ENV, "https://wms.example.com"),
            (FACTORY_CODE_ENV, "002"),
            (TIMEOUT_ENV, "30"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .expect("Should apply");

        assert_eq!(config.api_base_url, "https://wms.example.com");
        assert_eq!(config.factory_code, "002");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_bad_timeout_override() {
        let mut config = ClientConfig::default();
        let err = config
            .apply_overrides(|k| (k == TIMEOUT_ENV).then(|| "ten".to_string()))
            .expect_err("Should fail");
        assert!(matches!(err, ConfigError::Invalid { key: TIMEOUT_ENV, .. }));
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::default().validate().is_ok());

        let config = ClientConfig {
            api_base_url: "10.164.222.93:3000".into(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            factory_code: " ".into(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_connect_timeout_is_invalid() {
        let config = ClientConfig {
            connect_timeout_secs: 0,
            ..ClientConfig::default()
        };
        let err = config.validate().expect_err("Should fail");
        assert!(matches!(err, ConfigError::Invalid { key: "connect_timeout_secs", .. }));
    }

    #[test]
    fn test_server_host() {
        assert_eq!(ClientConfig::default().server_host(), "mespdamobile.condor.dz");
    }
}

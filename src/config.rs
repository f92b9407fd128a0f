//! # Client Configuration
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! The API key is not part of the config file; see [`ApiKey`].

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{ChemSpiderError, ChemSpiderResult};

/// Default API server
pub const DEFAULT_API_URL: &str = "https://api.rsc.org";

/// Default API version
pub const DEFAULT_API_VERSION: &str = "v1";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "CHEMSPIDER_API_KEY";

/// Environment variable overriding the API server
pub const API_URL_ENV: &str = "CHEMSPIDER_API_URL";

/// Environment variable overriding the API version
pub const API_VERSION_ENV: &str = "CHEMSPIDER_API_VERSION";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API server, without trailing slash
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API version path segment
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// User-Agent header; a crate default is used when absent
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Delay between status polls of an asynchronous query
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum status polls a background search performs
    #[serde(default = "default_max_poll_requests")]
    pub max_poll_requests: u32,

    /// Upper bound for the backoff used by `QuerySession::wait`
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}
fn default_timeout_ms() -> u64 {
    30_000
}
fn default_poll_interval_ms() -> u64 {
    200
}
fn default_max_poll_requests() -> u32 {
    40
}
fn default_max_backoff_ms() -> u64 {
    5_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_version: default_api_version(),
            user_agent: None,
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_requests: default_max_poll_requests(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ChemSpiderResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ChemSpiderError::Config(format!("Failed to read config: {}", e)))?;

        let config: ClientConfig = serde_json::from_str(&content)
            .map_err(|e| ChemSpiderError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> ChemSpiderResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `CHEMSPIDER_API_URL` / `CHEMSPIDER_API_VERSION` if set
    pub fn with_env_overrides(mut self) -> ChemSpiderResult<Self> {
        if let Ok(url) = env::var(API_URL_ENV) {
            self.api_url = url;
        }
        if let Ok(version) = env::var(API_VERSION_ENV) {
            self.api_version = version;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate field values
    pub fn validate(&self) -> ChemSpiderResult<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ChemSpiderError::Config(format!(
                "Invalid api_url: '{}'. Must be an http(s) URL.",
                self.api_url
            )));
        }
        if self.api_url.ends_with('/') {
            return Err(ChemSpiderError::Config(
                "api_url must not end with '/'".to_string(),
            ));
        }
        if self.api_version.is_empty() || self.api_version.contains('/') {
            return Err(ChemSpiderError::Config(format!(
                "Invalid api_version: '{}'",
                self.api_version
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ChemSpiderError::Config("timeout_ms must be > 0".to_string()));
        }
        if self.max_poll_requests == 0 {
            return Err(ChemSpiderError::Config(
                "max_poll_requests must be > 0".to_string(),
            ));
        }
        if self.max_backoff_ms < self.poll_interval_ms {
            return Err(ChemSpiderError::Config(
                "max_backoff_ms must be >= poll_interval_ms".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// User-Agent header value
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("chemspider-rs/{}", env!("CARGO_PKG_VERSION")))
    }
}

/// ChemSpider API key
///
/// Immutable once the client is built. `Debug` output never shows the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key; empty or whitespace-only input is an `Auth` error
    pub fn new(key: impl Into<String>) -> ChemSpiderResult<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(missing_key("API key must not be empty"));
        }
        Ok(Self(key))
    }

    /// Read the key from `CHEMSPIDER_API_KEY`
    pub fn from_env() -> ChemSpiderResult<Self> {
        let key = env::var(API_KEY_ENV)
            .map_err(|_| missing_key(&format!("{} is not set", API_KEY_ENV)))?;
        Self::new(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A missing key is reported like a rejected one
fn missing_key(message: &str) -> ChemSpiderError {
    ChemSpiderError::Auth {
        status: 401,
        message: message.to_string(),
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_url, "https://api.rsc.org");
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_url": "http://localhost:8080", "timeout_ms": 500}}"#).unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.timeout_ms, 500);
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.max_poll_requests, 40);
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = ClientConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ChemSpiderError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ClientConfig {
            api_url: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            api_url: "https://api.rsc.org/".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            poll_interval_ms: 10_000,
            max_backoff_ms: 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_user_agent_default() {
        let config = ClientConfig::default();
        assert!(config.user_agent().starts_with("chemspider-rs/"));

        let config = ClientConfig {
            user_agent: Some("my-app/1.0".into()),
            ..Default::default()
        };
        assert_eq!(config.user_agent(), "my-app/1.0");
    }

    #[test]
    fn test_api_key_rejects_empty() {
        assert!(matches!(
            ApiKey::new("").unwrap_err(),
            ChemSpiderError::Auth { status: 401, .. }
        ));
        assert!(ApiKey::new("   ").is_err());
        assert_eq!(ApiKey::new("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("secret-key").unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains("secret"));
    }
}

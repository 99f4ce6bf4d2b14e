//! # Admin Configuration
//!
//! Environment-based configuration for the admin CLI.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use cca_client::ClientConfig;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Admin CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL
    pub api_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Lifetime of the cached campaigns list
    pub campaigns_cache_ttl: Duration,

    /// File holding the bearer token between invocations
    pub session_file: PathBuf,

    /// Logging level
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .map_or(Duration::from_secs(default), Duration::from_secs)
        };

        Self {
            api_url: lookup("CCA_API_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),

            request_timeout: secs("CCA_REQUEST_TIMEOUT_SECS", 30),

            campaigns_cache_ttl: secs("CCA_CAMPAIGNS_CACHE_TTL_SECS", 300),

            session_file: lookup("CCA_SESSION_FILE")
                .map_or_else(|| PathBuf::from(".cca-session"), PathBuf::from),

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            log_format: match lookup("LOG_FORMAT").as_deref().map(str::trim) {
                Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }

    /// HTTP client settings derived from this configuration
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
            timeout: self.request_timeout,
            ..ClientConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `NAVDANA_API_BASE_URL` - Remote API base (default: `https://navdana.com/api/v1`)
//! - `NAVDANA_SESSION_FILE` - Durable session storage file (default: `.navdana/session.json`)
//! - `NAVDANA_SEARCH_DEBOUNCE_MS` - Live search quiet window (default: 300)
//! - `NAVDANA_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default remote API base.
pub const DEFAULT_API_BASE_URL: &str = "https://navdana.com/api/v1";

/// Default live search quiet window.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

const DEFAULT_SESSION_FILE: &str = ".navdana/session.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Validated base URL every endpoint path is appended to
    pub api_base_url: String,
    /// File backing the persisted session store
    pub session_file: PathBuf,
    /// Quiet window before a live search keystroke reaches the network
    pub search_debounce: Duration,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(
            "NAVDANA_API_BASE_URL",
            &get_env_or_default("NAVDANA_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let session_file = PathBuf::from(get_env_or_default(
            "NAVDANA_SESSION_FILE",
            DEFAULT_SESSION_FILE,
        ));
        let search_debounce = Duration::from_millis(parse_u64(
            "NAVDANA_SEARCH_DEBOUNCE_MS",
            &get_env_or_default("NAVDANA_SEARCH_DEBOUNCE_MS", "300"),
        )?);
        let http_timeout = Duration::from_secs(parse_u64(
            "NAVDANA_HTTP_TIMEOUT_SECS",
            &get_env_or_default(
                "NAVDANA_HTTP_TIMEOUT_SECS",
                &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
            ),
        )?);

        Ok(Self {
            api_base_url,
            session_file,
            search_debounce,
            http_timeout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at a different API base, other fields default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base` is not an http(s) URL.
    pub fn with_api_base(base: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("api_base_url", base)?,
            ..Self::default()
        })
    }

    /// Build the full URL for an endpoint path such as `product/search`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse and validate an API base URL.
fn parse_base_url(key: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "base URL must have a host".to_string(),
        ));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_production_api() {
        let config = StorefrontConfig::default();
        assert_eq!(
            config.endpoint("category"),
            "https://navdana.com/api/v1/category"
        );
        assert_eq!(config.search_debounce, Duration::from_millis(300));
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = StorefrontConfig::with_api_base("http://127.0.0.1:9000/api/v1/").unwrap();
        assert_eq!(
            config.endpoint("/user/send-otp"),
            "http://127.0.0.1:9000/api/v1/user/send-otp"
        );
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let result = StorefrontConfig::with_api_base("ftp://navdana.com/api");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_rejects_garbage_url() {
        assert!(StorefrontConfig::with_api_base("not a url").is_err());
    }

    #[test]
    fn test_parse_u64_reports_key() {
        let err = parse_u64("NAVDANA_SEARCH_DEBOUNCE_MS", "soon").unwrap_err();
        assert!(err.to_string().contains("NAVDANA_SEARCH_DEBOUNCE_MS"));
    }
}

//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LAPAK_API_URL` - Base URL of the store API (e.g. `http://192.168.1.10:3000`)
//! - `LAPAK_MERCHANT_PHONE` - Merchant number that receives checkout messages
//!
//! ## Optional
//! - `LAPAK_STATE_DIR` - Directory for persisted client state (default: `.lapak`)
//! - `LAPAK_MESSAGING_SCHEME` - Deep link scheme for the hand-off (default: `whatsapp`)
//! - `LAPAK_OPEN_COMMAND` - Program that opens deep links (default: `xdg-open`, `open` on macOS)
//! - `LAPAK_HTTP_TIMEOUT_SECS` - Request timeout (default: 30)
//! - `LAPAK_API_TOKEN` - Static bearer token for the API
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use lapak_core::PhoneNumber;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_STATE_DIR: &str = ".lapak";
const DEFAULT_MESSAGING_SCHEME: &str = "whatsapp";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";

#[cfg(target_os = "macos")]
const DEFAULT_OPEN_COMMAND: &str = "open";
#[cfg(not(target_os = "macos"))]
const DEFAULT_OPEN_COMMAND: &str = "xdg-open";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote API settings
    pub api: ApiConfig,
    /// Directory holding persisted cart and session state
    pub state_dir: PathBuf,
    /// Messaging hand-off settings
    pub messaging: MessagingConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Remote API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are appended to it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Optional static bearer token
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ApiConfig {
    /// API config with the default timeout and no token.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            token: None,
        }
    }
}

/// Messaging hand-off configuration.
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    /// Deep link scheme (`<scheme>://send?...`)
    pub scheme: String,
    /// Recipient of checkout messages
    pub merchant_phone: PhoneNumber,
    /// Program invoked with the deep link as its only argument
    pub open_command: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_source(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let source = Source(var);

        let base_url = source.required("LAPAK_API_URL")?;
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("LAPAK_API_URL".to_string(), e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "LAPAK_API_URL".to_string(),
                "must be an http(s) base URL".to_string(),
            ));
        }

        let timeout_secs = source
            .or_default("LAPAK_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("LAPAK_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let merchant_phone = PhoneNumber::parse(&source.required("LAPAK_MERCHANT_PHONE")?)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("LAPAK_MERCHANT_PHONE".to_string(), e.to_string())
            })?;

        let scheme = source.or_default("LAPAK_MESSAGING_SCHEME", DEFAULT_MESSAGING_SCHEME);
        validate_scheme(&scheme)?;

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
                token: source.optional("LAPAK_API_TOKEN").map(SecretString::from),
            },
            state_dir: PathBuf::from(source.or_default("LAPAK_STATE_DIR", DEFAULT_STATE_DIR)),
            messaging: MessagingConfig {
                scheme,
                merchant_phone,
                open_command: source.or_default("LAPAK_OPEN_COMMAND", DEFAULT_OPEN_COMMAND),
            },
            sentry_dsn: source.optional("SENTRY_DSN"),
            sentry_environment: source.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Source<F>(F);

impl<F: Fn(&str) -> Option<String>> Source<F> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// RFC 3986 scheme: a letter followed by letters, digits, `+`, `-` or `.`.
fn validate_scheme(scheme: &str) -> Result<(), ConfigError> {
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            "LAPAK_MESSAGING_SCHEME".to_string(),
            format!("'{scheme}' is not a valid URL scheme"),
        ))
    }
}

//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CLINIC_BACKEND_URL` - Base URL of the clinic REST backend
//!
//! ## Optional
//! - `CLINIC_SESSION_FILE` - Durable token storage (default: `.clinic-admin/session.json`)
//! - `CLINIC_CURRENCY` - Currency symbol used when displaying amounts (default: `$`)
//! - `CLINIC_HTTP_TIMEOUT_SECS` - Per-request transport timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_SESSION_FILE: &str = ".clinic-admin/session.json";
const DEFAULT_CURRENCY: &str = "$";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Clinic admin client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend; API paths are resolved against it
    pub backend_url: Url,
    /// File holding the persisted session tokens
    pub session_file: PathBuf,
    /// Currency symbol for display
    pub currency: String,
    /// Transport timeout for a single request
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
}

impl ClientConfig {
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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("CLINIC_BACKEND_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("CLINIC_BACKEND_URL".to_string()))?;
        let backend_url = parse_backend_url(&raw_url)?;

        let session_file = lookup("CLINIC_SESSION_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);
        let currency = lookup("CLINIC_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let http_timeout = match lookup("CLINIC_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                ConfigError::InvalidEnvVar("CLINIC_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let sentry_dsn = lookup("SENTRY_DSN");
        let sentry_environment = lookup("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = lookup("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            backend_url,
            session_file,
            currency,
            http_timeout,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
        })
    }

    /// Configuration pointing at a given backend with every other value
    /// defaulted. Used by tests and embedders that do not read the
    /// environment.
    #[must_use]
    pub fn for_backend(backend_url: Url, session_file: PathBuf) -> Self {
        Self {
            backend_url,
            session_file,
            currency: DEFAULT_CURRENCY.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
        }
    }
}

/// Parse the backend base URL.
///
/// A trailing slash is added so that relative API paths are joined below
/// any path prefix instead of replacing its last segment.
fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("CLINIC_BACKEND_URL".to_string(), e.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "CLINIC_BACKEND_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

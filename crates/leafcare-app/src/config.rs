//! Environment-driven runtime configuration.

use std::time::Duration;

use leafcare_upload::{DEFAULT_REQUEST_TIMEOUT, EndpointError, ServiceEndpoints};
use thiserror::Error;

/// Base URL of the diagnosis service.
pub const BACKEND_URL_ENV: &str = "LEAFCARE_BACKEND_URL";

/// Per-request timeout in whole seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "LEAFCARE_REQUEST_TIMEOUT_SECS";

/// `tracing` filter directives.
pub const LOG_FILTER_ENV: &str = "LEAFCARE_LOG";

/// Service URL used when nothing is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Service endpoints.
    pub endpoints: ServiceEndpoints,
    /// Bound on each upload or history request.
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Reads configuration from the environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Endpoint`] when the backend URL is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::with_overrides(None, None)
    }

    /// Reads configuration from the environment, letting explicit values win.
    ///
    /// # Errors
    /// Returns [`ConfigError::Endpoint`] when the backend URL is invalid.
    pub fn with_overrides(
        backend_url: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let backend_url = match backend_url {
            Some(url) => url.to_string(),
            None => std::env::var(BACKEND_URL_ENV)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
        };

        let request_timeout = match timeout_secs {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => request_timeout_from_env(),
        };

        Ok(Self {
            endpoints: ServiceEndpoints::from_base(&backend_url)?,
            request_timeout,
        })
    }
}

/// Reads the request timeout.
///
/// Semantics:
/// - Unset, unparsable, or `0` => [`DEFAULT_REQUEST_TIMEOUT`].
/// - Any positive integer => that many seconds.
pub fn request_timeout_from_env() -> Duration {
    std::env::var(REQUEST_TIMEOUT_ENV)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Backend URL failed validation.
    #[error("backend url: {0}")]
    Endpoint(#[from] EndpointError),
}

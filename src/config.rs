//! Licensewatch configuration.

use std::time::Duration;

/// Default interval between timer-driven license checks (5 minutes).
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default upper bound on a single verification request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// API base used when no environment override is set.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";

/// Environment variables consulted by [`resolve_api_base_url`], in order.
pub const API_URL_ENV_VARS: &[&str] = &["LICENSEWATCH_API_URL", "API_URL"];

/// Configuration for license verification and monitoring.
#[derive(Debug, Clone)]
pub struct LicenseWatchConfig {
    /// Application name and version (e.g., "viralvpn/1.4.0").
    pub app_name: &'static str,

    /// User-Agent product identifier (e.g., "viralvpn-mobile").
    pub user_agent_product: &'static str,

    /// Base URL of the license API, without a trailing slash
    /// (e.g., "https://licenses.example.com/api").
    pub api_base_url: String,

    /// Namespace for the on-disk store.
    /// Each product should use a unique namespace to avoid collisions.
    pub store_namespace: &'static str,

    /// Period of the timer trigger while a licensed screen is mounted.
    pub check_interval: Duration,

    /// Bound on a single verification call. Elapsing counts as a transient
    /// failure, never as a verdict.
    pub request_timeout: Duration,
}

impl LicenseWatchConfig {
    /// Config with default intervals and the API URL taken from the
    /// environment (see [`resolve_api_base_url`]).
    pub fn new(
        app_name: &'static str,
        user_agent_product: &'static str,
        store_namespace: &'static str,
    ) -> Self {
        Self {
            app_name,
            user_agent_product,
            api_base_url: resolve_api_base_url(),
            store_namespace,
            check_interval: DEFAULT_CHECK_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), crate::LicenseError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(crate::LicenseError::ConfigError(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if self.store_namespace.is_empty() {
            return Err(crate::LicenseError::ConfigError(
                "store_namespace cannot be empty".to_string(),
            ));
        }
        if self.check_interval.is_zero() {
            return Err(crate::LicenseError::ConfigError(
                "check_interval must be non-zero".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(crate::LicenseError::ConfigError(
                "request_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Full URL of the validate-license endpoint.
    pub fn validate_license_url(&self) -> String {
        format!(
            "{}/validate-license",
            self.api_base_url.trim_end_matches('/')
        )
    }
}

/// Resolve the license API base URL from the environment.
///
/// Checks [`API_URL_ENV_VARS`] in order and falls back to
/// [`DEFAULT_API_BASE_URL`]. Empty values are ignored.
pub fn resolve_api_base_url() -> String {
    resolve_api_base_url_with(|name| std::env::var(name).ok())
}

fn resolve_api_base_url_with(lookup: impl Fn(&str) -> Option<String>) -> String {
    API_URL_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

//! Reqwest-based HTTP client for the license verification service.

use crate::client::LicenseVerifier;
use crate::config::LicenseWatchConfig;
use crate::key::LicenseKey;
use crate::protocol::models::{HttpStatus, VerificationResult, VerifyRequest};
use crate::LicenseError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use tracing::{debug, warn};

/// HTTP verifier for `POST {api}/validate-license`.
pub struct HttpVerifier {
    client: Client,
    user_agent: String,
    url: String,
}

impl HttpVerifier {
    /// Create a new verifier from config.
    ///
    /// The reqwest client carries the configured request timeout, so a hung
    /// connection surfaces as a transport failure.
    pub fn new(config: &LicenseWatchConfig) -> Result<Self, LicenseError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LicenseError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::from_reqwest(config, client))
    }

    /// Create a verifier around an existing reqwest client.
    pub fn from_reqwest(config: &LicenseWatchConfig, client: Client) -> Self {
        Self {
            client,
            user_agent: build_user_agent(config),
            url: config.validate_license_url(),
        }
    }

    /// The endpoint this verifier posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send the request and return the raw status and body.
    async fn send(&self, key: &LicenseKey) -> Result<(HttpStatus, Vec<u8>), LicenseError> {
        let response = self
            .client
            .post(&self.url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .json(&VerifyRequest {
                license_key: key.as_str(),
            })
            .send()
            .await
            .map_err(|e| LicenseError::Transport(format!("Request failed: {}", e)))?;

        let status = HttpStatus(response.status().as_u16());
        let body = response
            .bytes()
            .await
            .map_err(|e| LicenseError::Transport(format!("Failed to read body: {}", e)))?
            .to_vec();

        Ok((status, body))
    }
}

#[async_trait]
impl LicenseVerifier for HttpVerifier {
    async fn verify(&self, key: &LicenseKey) -> VerificationResult {
        match self.send(key).await {
            Ok((status, body)) => {
                let result = VerificationResult::classify(status, &body);
                debug!(
                    key = %key.fingerprint(),
                    http_status = status.0,
                    result = result.label(),
                    "license verification response"
                );
                result
            }
            Err(e) => {
                warn!(key = %key.fingerprint(), error = %e, "license verification failed");
                VerificationResult::Error
            }
        }
    }
}

/// Build a User-Agent string from config.
///
/// Format: `<product>/licensewatch-<version> <app>`
/// Example: `viralvpn-mobile/licensewatch-0.1.0 viralvpn/1.4.0`
pub fn build_user_agent(config: &LicenseWatchConfig) -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        "{}/licensewatch-{} {}",
        config.user_agent_product, version, config.app_name
    )
}

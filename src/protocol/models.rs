//! Verification service wire types and result classification.

use crate::LicenseError;
use serde::{Deserialize, Serialize};

/// HTTP status code of a verification response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpStatus(pub u16);

impl HttpStatus {
    /// 2xx.
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }

    /// 5xx.
    pub fn is_server_error(self) -> bool {
        (500..600).contains(&self.0)
    }
}

/// Request body for `POST /validate-license`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest<'a> {
    /// The license key to check.
    pub license_key: &'a str,
}

/// Raw response body. Every field is optional so that shape problems end
/// up as a classification decision instead of a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// `"valid"`, `"expired"`, `"invalid"` or `"error"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Days until expiry; only meaningful for `valid`.
    #[serde(default)]
    pub remaining_days: Option<i64>,
    /// Servers unlocked by the license.
    #[serde(default)]
    pub servers: Option<Vec<Server>>,
    /// Human-readable detail from the service.
    #[serde(default)]
    pub message: Option<String>,
}

/// A server entry returned alongside a valid license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Server identifier.
    pub id: String,
    /// Display name. Empty when the service omits it.
    #[serde(default)]
    pub name: String,
    /// Country name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// City name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Hostname or IP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Reported status, e.g. "online".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Connection access key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
}

/// Outcome of one verification call. Exactly four cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// The license is active.
    Valid {
        /// Days until expiry. The service promises at least 1, but the
        /// reconciler treats `<= 0` as expired.
        remaining_days: i64,
        /// Servers unlocked by the license.
        servers: Vec<Server>,
    },
    /// The license reached its expiry date.
    Expired,
    /// The service does not know the key, or it was revoked.
    Invalid,
    /// No verdict: network failure, timeout, 5xx or malformed response.
    Error,
}

impl VerificationResult {
    /// Whether this result is a verdict on the license at all.
    pub fn is_verdict(&self) -> bool {
        !matches!(self, VerificationResult::Error)
    }

    /// Short label for log fields.
    pub fn label(&self) -> &'static str {
        match self {
            VerificationResult::Valid { .. } => "valid",
            VerificationResult::Expired => "expired",
            VerificationResult::Invalid => "invalid",
            VerificationResult::Error => "error",
        }
    }

    /// Classify an HTTP response from the verification service.
    ///
    /// - 5xx is always `Error`, whatever the body says.
    /// - An explicit `"invalid"` payload is definitive, including when it
    ///   arrives with a 4xx status (unknown keys come back as 404).
    /// - Any other 4xx, an unparseable body, a missing or unknown status, or
    ///   `"valid"` without `remainingDays` is `Error`.
    pub fn classify(status: HttpStatus, body: &[u8]) -> Self {
        if status.is_server_error() {
            return VerificationResult::Error;
        }

        let response = match parse_verify_response(body) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(http_status = status.0, error = %e, "unparseable verification response");
                return VerificationResult::Error;
            }
        };

        let result = Self::from_response(response);
        if status.is_success() || result == VerificationResult::Invalid {
            result
        } else {
            VerificationResult::Error
        }
    }

    /// Classify a parsed response body, ignoring transport status.
    pub fn from_response(response: VerifyResponse) -> Self {
        match response.status.as_deref() {
            Some("valid") => match response.remaining_days {
                Some(remaining_days) => VerificationResult::Valid {
                    remaining_days,
                    servers: response.servers.unwrap_or_default(),
                },
                None => VerificationResult::Error,
            },
            Some("expired") => VerificationResult::Expired,
            Some("invalid") => VerificationResult::Invalid,
            _ => VerificationResult::Error,
        }
    }
}

/// Parse raw JSON body into a verification response.
pub fn parse_verify_response(body: &[u8]) -> Result<VerifyResponse, LicenseError> {
    serde_json::from_slice(body).map_err(|e| {
        LicenseError::ProtocolError(format!("Failed to parse verification response: {}", e))
    })
}

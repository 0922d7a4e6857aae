//! Licensewatch error types.

use thiserror::Error;

/// Errors that can occur while activating, checking or storing a license.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No license key provided.
    #[error("No license key provided")]
    MissingLicense,

    /// License key does not match `XXXX-XXXX-XXXX-XXXX`.
    #[error("Invalid license key format: {0}")]
    InvalidKeyFormat(String),

    /// The verification service does not know this key.
    #[error("License key rejected")]
    LicenseRejected,

    /// The verification service reports the license as expired.
    #[error("License expired")]
    LicenseExpired,

    /// The verification service could not produce a verdict.
    #[error("License verification unavailable")]
    VerificationUnavailable,

    /// Failed to parse a verification service response.
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// HTTP transport error communicating with the verification service.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local store I/O error.
    #[error("Store I/O error: {0}")]
    StoreIO(String),

    /// Local store holds a value that cannot be decoded.
    #[error("Store value corrupt for key {key}")]
    StoreCorrupt {
        /// The store key holding the bad value.
        key: String,
    },

    /// Selected server is not in the cached server list.
    #[error("Unknown server: {id}")]
    UnknownServer {
        /// The server id that was requested.
        id: String,
    },
}

impl LicenseError {
    /// Whether retrying the same request later may succeed.
    ///
    /// Only failures to reach a verdict are retryable; a rejected or expired
    /// license, or a badly formatted key, will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LicenseError::VerificationUnavailable
                | LicenseError::Transport(_)
                | LicenseError::StoreIO(_)
        )
    }

    /// Message suitable for showing on the license entry screen.
    pub fn user_message(&self) -> &'static str {
        match self {
            LicenseError::MissingLicense => "Please enter a license key.",
            LicenseError::InvalidKeyFormat(_) => {
                "License key format: XXXX-XXXX-XXXX-XXXX (uppercase letters and digits)."
            }
            LicenseError::LicenseRejected => {
                "This license key is not valid. Please check the key and try again."
            }
            LicenseError::LicenseExpired => {
                "This license has expired. Please purchase a new license."
            }
            LicenseError::VerificationUnavailable | LicenseError::Transport(_) => {
                "Could not verify the license. Check your connection and try again."
            }
            _ => "Something went wrong. Please try again later.",
        }
    }
}

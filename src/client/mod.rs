//! License Verification Service boundary.

pub mod http;

use crate::key::LicenseKey;
use crate::protocol::models::VerificationResult;
use async_trait::async_trait;
use std::time::Duration;

/// Something that can ask the verification service about a key.
///
/// Implementations never fail: anything that prevents a verdict is reported
/// as [`VerificationResult::Error`].
#[async_trait]
pub trait LicenseVerifier: Send + Sync {
    /// Verify a license key with the service. Called once per check.
    async fn verify(&self, key: &LicenseKey) -> VerificationResult;
}

/// Verify with an upper bound on how long the service may take.
///
/// Elapsing is reported as [`VerificationResult::Error`]: a slow service
/// says nothing about the license.
pub async fn verify_with_timeout(
    verifier: &dyn LicenseVerifier,
    key: &LicenseKey,
    timeout: Duration,
) -> VerificationResult {
    match tokio::time::timeout(timeout, verifier.verify(key)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                key = %key.fingerprint(),
                timeout_ms = timeout.as_millis() as u64,
                "license verification timed out"
            );
            VerificationResult::Error
        }
    }
}

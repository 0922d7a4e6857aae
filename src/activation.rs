//! License entry and activation.
//!
//! Turns what the user typed into a stored license:
//! 1. Local format check (no network call for malformed keys)
//! 2. One time-bounded verification call
//! 3. Persist the record and server list on `valid`
//!
//! A rejected license and an unreachable service produce different errors;
//! only the latter is worth retrying.

use crate::client::{verify_with_timeout, LicenseVerifier};
use crate::clock::{Clock, SystemClock};
use crate::config::LicenseWatchConfig;
use crate::key::LicenseKey;
use crate::protocol::models::{Server, VerificationResult};
use crate::store::record::LicenseRecord;
use crate::store::KeyValueStore;
use crate::LicenseError;
use std::sync::Arc;
use tracing::{info, warn};

/// A license that was just activated.
#[derive(Debug, Clone)]
pub struct ActivatedLicense {
    /// The stored record.
    pub record: LicenseRecord,

    /// Servers unlocked by the license.
    pub servers: Vec<Server>,
}

/// Activation flow for the license entry screen.
pub struct Activator {
    config: LicenseWatchConfig,
    store: Arc<dyn KeyValueStore>,
    verifier: Arc<dyn LicenseVerifier>,
    clock: Arc<dyn Clock>,
}

impl Activator {
    /// Create a new activator using the system clock.
    pub fn new(
        config: LicenseWatchConfig,
        store: Arc<dyn KeyValueStore>,
        verifier: Arc<dyn LicenseVerifier>,
    ) -> Result<Self, LicenseError> {
        Self::with_clock(config, store, verifier, Arc::new(SystemClock))
    }

    /// Create an activator with a custom clock.
    pub fn with_clock(
        config: LicenseWatchConfig,
        store: Arc<dyn KeyValueStore>,
        verifier: Arc<dyn LicenseVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LicenseError> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            verifier,
            clock,
        })
    }

    /// Activate the license key the user entered.
    ///
    /// # Errors
    /// - `MissingLicense` - nothing was entered
    /// - `InvalidKeyFormat` - not `XXXX-XXXX-XXXX-XXXX`; no request was made
    /// - `LicenseRejected` - the service does not know the key
    /// - `LicenseExpired` - the license has expired
    /// - `VerificationUnavailable` - no verdict (network, timeout, bad response); retryable
    /// - `StoreIO` - the verified license could not be saved
    pub async fn activate(&self, input: &str) -> Result<ActivatedLicense, LicenseError> {
        let key = LicenseKey::parse(input)?;

        let verification =
            verify_with_timeout(self.verifier.as_ref(), &key, self.config.request_timeout).await;

        match verification {
            VerificationResult::Valid {
                remaining_days,
                servers,
            } if remaining_days > 0 => {
                let record = LicenseRecord::new(key, remaining_days, self.clock.as_ref());
                record.save_activation(self.store.as_ref(), &servers)?;
                info!(
                    key = %record.key.fingerprint(),
                    remaining_days,
                    servers = servers.len(),
                    "license activated"
                );
                Ok(ActivatedLicense { record, servers })
            }
            VerificationResult::Valid { .. } | VerificationResult::Expired => {
                info!(key = %key.fingerprint(), "activation refused: license expired");
                Err(LicenseError::LicenseExpired)
            }
            VerificationResult::Invalid => {
                info!(key = %key.fingerprint(), "activation refused: license unknown");
                Err(LicenseError::LicenseRejected)
            }
            VerificationResult::Error => {
                warn!(key = %key.fingerprint(), "activation could not reach a verdict");
                Err(LicenseError::VerificationUnavailable)
            }
        }
    }
}

//! License reconciliation.
//!
//! Maps the cached record and a fresh verification result to a
//! [`LicenseStatus`] and the list of [`Effect`]s the caller has to apply.
//! Nothing here touches storage or navigation.
//!
//! Decision order (first match wins):
//! 1. No stored key: deleted, log out.
//! 2. `Expired`, or `Valid` with `remaining_days <= 0`: expired, log out.
//! 3. `Invalid`: deleted, log out.
//! 4. `Valid` with days left: valid, refresh the cached day count.
//! 5. `Error`: no verdict. Keep everything, report the last known day count.

use crate::protocol::models::VerificationResult;
use crate::store::record::LicenseRecord;
use serde::Serialize;

/// Derived license status. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseStatus {
    /// The service confirmed the license.
    pub is_valid: bool,
    /// The license reached its expiry date.
    pub is_expired: bool,
    /// There is no license: nothing stored, or the service does not know it.
    pub is_deleted: bool,
    /// Days until expiry (last known value when unverified).
    pub remaining_days: i64,
    /// The caller must leave the licensed flow.
    pub should_logout: bool,
}

impl LicenseStatus {
    /// Nothing stored, or the service does not know the key.
    pub const fn deleted() -> Self {
        Self {
            is_valid: false,
            is_expired: false,
            is_deleted: true,
            remaining_days: 0,
            should_logout: true,
        }
    }

    /// The license is past its expiry date.
    pub const fn expired() -> Self {
        Self {
            is_valid: false,
            is_expired: true,
            is_deleted: false,
            remaining_days: 0,
            should_logout: true,
        }
    }

    /// Confirmed valid with `remaining_days` left.
    pub const fn valid(remaining_days: i64) -> Self {
        Self {
            is_valid: true,
            is_expired: false,
            is_deleted: false,
            remaining_days,
            should_logout: false,
        }
    }

    /// No verdict could be reached. Access is kept.
    pub const fn unverified(last_known_days: i64) -> Self {
        Self {
            is_valid: false,
            is_expired: false,
            is_deleted: false,
            remaining_days: last_known_days,
            should_logout: false,
        }
    }

    /// True when the check failed to produce a verdict.
    pub fn is_unverified(&self) -> bool {
        !self.is_valid && !self.is_expired && !self.is_deleted && !self.should_logout
    }
}

/// A side effect requested by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Remove the license record and every dependent cached key.
    ClearLicense,
    /// Replace the current screen with the license entry screen.
    NavigateToEntry,
    /// Store the refreshed day count and verification time.
    PersistRemainingDays(i64),
}

/// Result of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Status for the caller.
    pub status: LicenseStatus,
    /// Effects to apply, in order.
    pub effects: Vec<Effect>,
}

impl Reconciliation {
    fn logout(status: LicenseStatus) -> Self {
        Self {
            status,
            effects: vec![Effect::ClearLicense, Effect::NavigateToEntry],
        }
    }
}

/// Reconcile the cached record against a verification result.
pub fn reconcile(
    cached: Option<&LicenseRecord>,
    verification: &VerificationResult,
) -> Reconciliation {
    let Some(cached) = cached else {
        return Reconciliation::logout(LicenseStatus::deleted());
    };

    match verification {
        VerificationResult::Expired => Reconciliation::logout(LicenseStatus::expired()),
        VerificationResult::Valid { remaining_days, .. } if *remaining_days <= 0 => {
            Reconciliation::logout(LicenseStatus::expired())
        }
        VerificationResult::Invalid => Reconciliation::logout(LicenseStatus::deleted()),
        VerificationResult::Valid { remaining_days, .. } => Reconciliation {
            status: LicenseStatus::valid(*remaining_days),
            effects: vec![Effect::PersistRemainingDays(*remaining_days)],
        },
        VerificationResult::Error => Reconciliation {
            status: LicenseStatus::unverified(cached.remaining_days),
            effects: Vec::new(),
        },
    }
}

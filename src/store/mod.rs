//! Persistent Key-Value Store boundary.
//!
//! The license record and everything cached alongside it live under a fixed
//! set of string keys (see [`keys`]). Implementations must apply
//! [`KeyValueStore::set_many`] and [`KeyValueStore::remove_many`] as a single
//! operation: a logout that clears half the keys would leave a record that
//! looks logged in but has no server list.

pub mod file;
pub mod memory;
pub mod record;

use crate::LicenseError;

/// Well-known store keys.
pub mod keys {
    /// The activated license key.
    pub const LICENSE_KEY: &str = "license_key";
    /// Last known days until expiry.
    pub const REMAINING_DAYS: &str = "license_remaining_days";
    /// JSON array of servers returned at activation.
    pub const SERVERS: &str = "license_servers";
    /// JSON object of the server the user picked.
    pub const SELECTED_SERVER: &str = "selected_server";
    /// RFC 3339 time of the last successful verification.
    pub const VERIFIED_AT: &str = "license_verified_at";
    /// `"true"`/`"false"` auto-connect preference.
    pub const AUTO_CONNECT: &str = "pref_auto_connect";
    /// `"true"`/`"false"` kill-switch preference.
    pub const KILL_SWITCH: &str = "pref_kill_switch";

    /// Keys that exist only while a license is active. Cleared together.
    pub const LICENSE_KEYS: &[&str] = &[
        LICENSE_KEY,
        REMAINING_DAYS,
        SERVERS,
        SELECTED_SERVER,
        VERIFIED_AT,
    ];

    /// User preferences, kept across automatic logouts.
    pub const PREFERENCE_KEYS: &[&str] = &[AUTO_CONNECT, KILL_SWITCH];
}

/// Device-local durable string storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, LicenseError>;

    /// Write several values as one operation.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), LicenseError>;

    /// Remove several keys as one operation. Missing keys are ignored.
    fn remove_many(&self, keys: &[&str]) -> Result<(), LicenseError>;

    /// Write several values only if `guard_key` currently holds `expected`.
    ///
    /// The comparison and the write happen as one operation. Returns
    /// `false`, writing nothing, when the guard does not match.
    fn set_many_if(
        &self,
        guard_key: &str,
        expected: &str,
        entries: &[(&str, String)],
    ) -> Result<bool, LicenseError>;

    /// Write one value.
    fn set(&self, key: &str, value: &str) -> Result<(), LicenseError> {
        self.set_many(&[(key, value.to_string())])
    }

    /// Remove one key.
    fn remove(&self, key: &str) -> Result<(), LicenseError> {
        self.remove_many(&[key])
    }
}

//! The persisted license record.
//!
//! A record is spread over several store keys so the host app can read
//! individual values directly:
//! - `license_key` (required; its presence means "logged in")
//! - `license_remaining_days` (decimal integer)
//! - `license_verified_at` (RFC 3339)
//! - `license_servers` (JSON array, written at activation)

use crate::clock::Clock;
use crate::key::LicenseKey;
use crate::protocol::models::Server;
use crate::store::{keys, KeyValueStore};
use crate::LicenseError;
use chrono::{DateTime, Utc};

/// Locally cached license state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseRecord {
    /// The activated key.
    pub key: LicenseKey,

    /// Last known days until expiry.
    pub remaining_days: i64,

    /// When the service last confirmed the license.
    pub verified_at: Option<DateTime<Utc>>,
}

impl LicenseRecord {
    /// Create a record for a license that was just verified.
    pub fn new(key: LicenseKey, remaining_days: i64, clock: &dyn Clock) -> Self {
        Self {
            key,
            remaining_days,
            verified_at: Some(clock.now_utc()),
        }
    }

    /// Load the record from the store.
    ///
    /// The cached day count and timestamp are advisory: unreadable values
    /// load as 0 and `None`. The key itself is not.
    ///
    /// # Errors
    /// - `StoreIO` - the store could not be read
    /// - `StoreCorrupt` - a key is stored but is not a well-formed license key
    pub fn load(store: &dyn KeyValueStore) -> Result<Option<Self>, LicenseError> {
        let Some(raw_key) = store.get(keys::LICENSE_KEY)? else {
            return Ok(None);
        };

        let key = LicenseKey::parse(&raw_key).map_err(|_| LicenseError::StoreCorrupt {
            key: keys::LICENSE_KEY.to_string(),
        })?;

        let remaining_days = store
            .get(keys::REMAINING_DAYS)?
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0);

        let verified_at = store
            .get(keys::VERIFIED_AT)?
            .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(Some(Self {
            key,
            remaining_days,
            verified_at,
        }))
    }

    /// Persist a freshly activated record with its server list.
    ///
    /// Replaces any previous selection, since it may point at a server the
    /// new license does not include. The selection is dropped first: if
    /// either step fails, no license key has been written.
    pub fn save_activation(
        &self,
        store: &dyn KeyValueStore,
        servers: &[Server],
    ) -> Result<(), LicenseError> {
        let servers_json = serde_json::to_string(servers)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to serialize servers: {}", e)))?;

        let mut entries = vec![
            (keys::LICENSE_KEY, self.key.as_str().to_string()),
            (keys::REMAINING_DAYS, self.remaining_days.to_string()),
            (keys::SERVERS, servers_json),
        ];
        if let Some(verified_at) = self.verified_at {
            entries.push((keys::VERIFIED_AT, verified_at.to_rfc3339()));
        }

        store.remove(keys::SELECTED_SERVER)?;
        store.set_many(&entries)
    }

    /// Persist a refreshed day count after a successful check of `key`.
    ///
    /// Writes only while `key` is still the stored license. Returns `false`
    /// (nothing written) if it was removed or replaced in the meantime.
    pub fn save_refresh(
        store: &dyn KeyValueStore,
        key: &LicenseKey,
        remaining_days: i64,
        clock: &dyn Clock,
    ) -> Result<bool, LicenseError> {
        store.set_many_if(
            keys::LICENSE_KEY,
            key.as_str(),
            &[
                (keys::REMAINING_DAYS, remaining_days.to_string()),
                (keys::VERIFIED_AT, clock.now_utc().to_rfc3339()),
            ],
        )
    }

    /// Remove the record and every key cached alongside it.
    pub fn clear(store: &dyn KeyValueStore) -> Result<(), LicenseError> {
        store.remove_many(keys::LICENSE_KEYS)
    }
}

/// Load the server list cached at activation. Missing means empty.
pub fn load_servers(store: &dyn KeyValueStore) -> Result<Vec<Server>, LicenseError> {
    match store.get(keys::SERVERS)? {
        Some(json) => serde_json::from_str(&json).map_err(|_| LicenseError::StoreCorrupt {
            key: keys::SERVERS.to_string(),
        }),
        None => Ok(Vec::new()),
    }
}

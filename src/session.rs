//! Licensed session state: servers, preferences and user logout.

use crate::key::LicenseKey;
use crate::navigation::Navigator;
use crate::protocol::models::Server;
use crate::store::record::{load_servers, LicenseRecord};
use crate::store::{keys, KeyValueStore};
use crate::LicenseError;
use std::sync::Arc;
use tracing::info;

/// License details for a profile or settings view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseSummary {
    /// Key with the middle groups hidden.
    pub masked_key: String,
    /// Last known days until expiry.
    pub remaining_days: i64,
}

/// Access to the state cached alongside an active license.
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
}

impl Session {
    /// Create a session over the given store.
    pub fn new(store: Arc<dyn KeyValueStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// Servers cached at activation.
    pub fn cached_servers(&self) -> Result<Vec<Server>, LicenseError> {
        load_servers(self.store.as_ref())
    }

    /// Remember the server the user picked.
    ///
    /// # Errors
    /// `UnknownServer` if `id` is not one of the cached servers.
    pub fn select_server(&self, id: &str) -> Result<Server, LicenseError> {
        let server = self
            .cached_servers()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| LicenseError::UnknownServer { id: id.to_string() })?;

        let json = serde_json::to_string(&server)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to serialize server: {}", e)))?;
        self.store.set(keys::SELECTED_SERVER, &json)?;

        Ok(server)
    }

    /// The server the user picked, if any.
    pub fn selected_server(&self) -> Result<Option<Server>, LicenseError> {
        match self.store.get(keys::SELECTED_SERVER)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|_| LicenseError::StoreCorrupt {
                    key: keys::SELECTED_SERVER.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Auto-connect preference (default off).
    pub fn auto_connect(&self) -> Result<bool, LicenseError> {
        self.flag(keys::AUTO_CONNECT)
    }

    /// Set the auto-connect preference.
    pub fn set_auto_connect(&self, enabled: bool) -> Result<(), LicenseError> {
        self.store.set(keys::AUTO_CONNECT, &enabled.to_string())
    }

    /// Kill-switch preference (default off).
    pub fn kill_switch(&self) -> Result<bool, LicenseError> {
        self.flag(keys::KILL_SWITCH)
    }

    /// Set the kill-switch preference.
    pub fn set_kill_switch(&self, enabled: bool) -> Result<(), LicenseError> {
        self.store.set(keys::KILL_SWITCH, &enabled.to_string())
    }

    /// Masked key and remaining days, or `None` when logged out.
    ///
    /// A malformed stored key is reported as logged out; the monitor clears
    /// it on its next check.
    pub fn license_summary(&self) -> Result<Option<LicenseSummary>, LicenseError> {
        match LicenseRecord::load(self.store.as_ref()) {
            Ok(record) => Ok(record.map(|r| LicenseSummary {
                masked_key: r.key.masked(),
                remaining_days: r.remaining_days,
            })),
            Err(LicenseError::StoreCorrupt { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The stored key, for hosts that show it in full on request.
    pub fn license_key(&self) -> Result<Option<LicenseKey>, LicenseError> {
        Ok(LicenseRecord::load(self.store.as_ref())?.map(|r| r.key))
    }

    /// User-initiated logout.
    ///
    /// Unlike an automatic logout this also forgets the preferences. License
    /// and preference keys are removed in one store operation.
    pub fn logout(&self) -> Result<(), LicenseError> {
        let all: Vec<&str> = keys::LICENSE_KEYS
            .iter()
            .chain(keys::PREFERENCE_KEYS)
            .copied()
            .collect();
        self.store.remove_many(&all)?;

        info!("user logged out");
        self.navigator.replace_with_license_entry();
        Ok(())
    }

    fn flag(&self, key: &str) -> Result<bool, LicenseError> {
        Ok(self.store.get(key)?.as_deref() == Some("true"))
    }
}

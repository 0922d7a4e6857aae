//! Test doubles shared by the unit tests.

use crate::client::LicenseVerifier;
use crate::config::{LicenseWatchConfig, DEFAULT_REQUEST_TIMEOUT};
use crate::key::LicenseKey;
use crate::navigation::Navigator;
use crate::protocol::models::{Server, VerificationResult};
use crate::store::KeyValueStore;
use crate::LicenseError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

pub(crate) fn test_config() -> LicenseWatchConfig {
    LicenseWatchConfig {
        app_name: "test-app/0.1.0",
        user_agent_product: "test-product",
        api_base_url: "http://127.0.0.1:9/api".to_string(),
        store_namespace: "licensewatch-test",
        check_interval: Duration::from_secs(300),
        request_timeout: DEFAULT_REQUEST_TIMEOUT,
    }
}

pub(crate) fn valid(days: i64) -> VerificationResult {
    VerificationResult::Valid {
        remaining_days: days,
        servers: vec![server("1", "US East"), server("2", "Frankfurt")],
    }
}

pub(crate) fn server(id: &str, name: &str) -> Server {
    Server {
        id: id.to_string(),
        name: name.to_string(),
        country: None,
        city: None,
        ip: None,
        port: Some(8388),
        status: Some("online".to_string()),
        access_key: None,
    }
}

/// Verifier that replays a fixed result and counts calls.
///
/// When gated, each call waits for [`ScriptedVerifier::release`] before
/// answering.
pub(crate) struct ScriptedVerifier {
    result: VerificationResult,
    calls: AtomicUsize,
    gate: Option<Notify>,
}

impl ScriptedVerifier {
    pub(crate) fn always(result: VerificationResult) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub(crate) fn gated(result: VerificationResult) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::always(result)
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl LicenseVerifier for ScriptedVerifier {
    async fn verify(&self, _key: &LicenseKey) -> VerificationResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.result.clone()
    }
}

/// Navigator that counts calls.
#[derive(Default)]
pub(crate) struct RecordingNavigator {
    calls: AtomicUsize,
}

impl RecordingNavigator {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn replace_with_license_entry(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Store whose reads, writes or removals fail.
pub(crate) struct BrokenStore {
    pub(crate) inner: crate::store::memory::MemoryStore,
    pub(crate) fail_reads: bool,
    pub(crate) fail_writes: bool,
    pub(crate) fail_removes: bool,
}

impl KeyValueStore for BrokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, LicenseError> {
        if self.fail_reads {
            return Err(LicenseError::StoreIO("disk unavailable".to_string()));
        }
        self.inner.get(key)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), LicenseError> {
        if self.fail_writes {
            return Err(LicenseError::StoreIO("disk full".to_string()));
        }
        self.inner.set_many(entries)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), LicenseError> {
        if self.fail_writes || self.fail_removes {
            return Err(LicenseError::StoreIO("disk full".to_string()));
        }
        self.inner.remove_many(keys)
    }

    fn set_many_if(
        &self,
        guard_key: &str,
        expected: &str,
        entries: &[(&str, String)],
    ) -> Result<bool, LicenseError> {
        if self.fail_writes {
            return Err(LicenseError::StoreIO("disk full".to_string()));
        }
        self.inner.set_many_if(guard_key, expected, entries)
    }
}

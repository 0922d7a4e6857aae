//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use licensewatch::{
    LicenseKey, LicenseVerifier, LicenseWatchConfig, MemoryStore, Navigator, Server,
    VerificationResult,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const KEY: &str = "DEMO-1234-5678-9ABC";

pub fn config(api_base_url: &str) -> LicenseWatchConfig {
    LicenseWatchConfig {
        app_name: "integration/0.1.0",
        user_agent_product: "licensewatch-tests",
        api_base_url: api_base_url.to_string(),
        store_namespace: "licensewatch-integration",
        check_interval: Duration::from_secs(300),
        request_timeout: Duration::from_secs(2),
    }
}

pub fn offline_config() -> LicenseWatchConfig {
    config("http://127.0.0.1:9/api")
}

pub fn server(id: &str, name: &str) -> Server {
    Server {
        id: id.to_string(),
        name: name.to_string(),
        country: Some("US".to_string()),
        city: None,
        ip: Some("203.0.113.10".to_string()),
        port: Some(8388),
        status: Some("online".to_string()),
        access_key: None,
    }
}

pub fn valid(days: i64) -> VerificationResult {
    VerificationResult::Valid {
        remaining_days: days,
        servers: vec![server("1", "US East"), server("2", "Frankfurt")],
    }
}

/// A store holding an activated license.
pub fn licensed_store(remaining_days: i64) -> Arc<MemoryStore> {
    let days = remaining_days.to_string();
    Arc::new(MemoryStore::with_entries([
        ("license_key", KEY),
        ("license_remaining_days", days.as_str()),
    ]))
}

/// Verifier that answers from a script, then repeats its fallback.
pub struct ScriptedVerifier {
    script: Mutex<VecDeque<VerificationResult>>,
    fallback: VerificationResult,
    calls: AtomicUsize,
    gate: Option<Notify>,
}

impl ScriptedVerifier {
    pub fn always(result: VerificationResult) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: result,
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Every call blocks until [`ScriptedVerifier::release`].
    pub fn gated(result: VerificationResult) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::always(result)
        }
    }

    pub fn then(self, result: VerificationResult) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn release(&self) {
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
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    calls: AtomicUsize,
}

impl RecordingNavigator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn replace_with_license_entry(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

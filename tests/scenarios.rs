//! End-to-end license gating through the public API.

mod common;

use common::{licensed_store, offline_config, valid, RecordingNavigator, ScriptedVerifier, KEY};
use licensewatch::{
    Activator, CheckOutcome, FileStore, KeyValueStore, LicenseError, LicenseMonitor,
    LicenseRecord, LicenseStatus, MemoryStore, Session, VerificationResult,
};
use std::sync::Arc;
use std::time::Duration;

fn monitor_with(
    store: Arc<dyn KeyValueStore>,
    verifier: Arc<ScriptedVerifier>,
) -> (LicenseMonitor, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::default());
    let monitor =
        LicenseMonitor::new(offline_config(), store, verifier, navigator.clone()).unwrap();
    (monitor, navigator)
}

#[tokio::test]
async fn test_valid_license_stays_logged_in() {
    let store = licensed_store(12);
    let verifier = Arc::new(ScriptedVerifier::always(valid(30)));
    let (monitor, navigator) = monitor_with(store.clone(), verifier.clone());

    let screen = monitor.mount();
    let outcome = screen.on_focus().await;

    assert_eq!(outcome, CheckOutcome::Completed(LicenseStatus::valid(30)));
    let status = outcome.status().unwrap();
    assert!(status.is_valid);
    assert!(!status.should_logout);
    assert_eq!(status.remaining_days, 30);

    assert_eq!(verifier.calls(), 1);
    assert_eq!(navigator.calls(), 0);
    assert_eq!(
        store.get("license_remaining_days").unwrap().as_deref(),
        Some("30")
    );
    assert!(store.get("license_verified_at").unwrap().is_some());
}

#[tokio::test]
async fn test_expired_license_logs_out() {
    let store = licensed_store(1);
    store.set("pref_kill_switch", "true").unwrap();
    let verifier = Arc::new(ScriptedVerifier::always(VerificationResult::Expired));
    let (monitor, navigator) = monitor_with(store.clone(), verifier);

    let screen = monitor.mount();
    let status = screen.on_focus().await.status().unwrap();

    assert!(status.is_expired);
    assert!(status.should_logout);
    assert!(!status.is_valid);
    assert_eq!(navigator.calls(), 1);
    assert_eq!(LicenseRecord::load(&*store).unwrap(), None);
    // Automatic logout leaves preferences alone.
    assert_eq!(
        store.get("pref_kill_switch").unwrap().as_deref(),
        Some("true")
    );
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_check_keeps_cached_state() {
    let store = licensed_store(12);
    let before = store.snapshot().unwrap();
    // Never released: the call only ends when the request timeout elapses.
    let verifier = Arc::new(ScriptedVerifier::gated(valid(30)));
    let (monitor, navigator) = monitor_with(store.clone(), verifier.clone());

    let screen = monitor.mount();
    let status = screen.on_focus().await.status().unwrap();

    assert!(!status.should_logout);
    assert!(!status.is_valid);
    assert!(status.is_unverified());
    assert_eq!(status.remaining_days, 12);
    assert_eq!(verifier.calls(), 1);
    assert_eq!(navigator.calls(), 0);
    assert_eq!(store.snapshot().unwrap(), before);
}

#[tokio::test]
async fn test_missing_key_logs_out_without_network() {
    let store = Arc::new(MemoryStore::new());
    let verifier = Arc::new(ScriptedVerifier::always(valid(30)));
    let (monitor, navigator) = monitor_with(store, verifier.clone());

    let screen = monitor.mount();
    let status = screen.on_focus().await.status().unwrap();

    assert!(status.should_logout);
    assert!(status.is_deleted);
    assert_eq!(verifier.calls(), 0);
    assert_eq!(navigator.calls(), 1);
}

#[tokio::test]
async fn test_overlapping_focus_triggers_make_one_call() {
    let store = licensed_store(12);
    let verifier = Arc::new(ScriptedVerifier::gated(valid(30)));
    let (monitor, _) = monitor_with(store, verifier.clone());

    let screen = Arc::new(monitor.mount());
    let first = tokio::spawn({
        let screen = screen.clone();
        async move { screen.on_focus().await }
    });
    while verifier.calls() == 0 {
        tokio::task::yield_now().await;
    }
    assert!(monitor.is_checking());

    let second = screen.on_focus().await;
    assert_eq!(second, CheckOutcome::Skipped);

    verifier.release();
    let first = first.await.unwrap();

    assert_eq!(first, CheckOutcome::Completed(LicenseStatus::valid(30)));
    assert_eq!(verifier.calls(), 1);
    assert!(!monitor.is_checking());
}

#[tokio::test]
async fn test_shutdown_mid_check_discards_logout() {
    let store = licensed_store(3);
    let verifier = Arc::new(ScriptedVerifier::gated(VerificationResult::Invalid));
    let (monitor, navigator) = monitor_with(store.clone(), verifier.clone());

    let screen = monitor.mount();
    let (outcome, _) = tokio::join!(screen.on_focus(), async {
        while verifier.calls() == 0 {
            tokio::task::yield_now().await;
        }
        monitor.shutdown();
        verifier.release();
    });

    assert!(matches!(outcome, CheckOutcome::Discarded(status) if status.is_deleted));
    assert_eq!(navigator.calls(), 0);
    assert!(store.get("license_key").unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_timer_checks_while_mounted() {
    let store = licensed_store(12);
    let verifier = Arc::new(ScriptedVerifier::always(valid(11)));
    let (monitor, _) = monitor_with(store.clone(), verifier.clone());

    let screen = monitor.mount();
    tokio::time::sleep(Duration::from_secs(299)).await;
    assert_eq!(verifier.calls(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(verifier.calls(), 1);
    assert_eq!(
        store.get("license_remaining_days").unwrap().as_deref(),
        Some("11")
    );

    screen.unmount();
    tokio::time::sleep(Duration::from_secs(900)).await;
    assert_eq!(verifier.calls(), 1);
}

#[tokio::test]
async fn test_activation_then_deletion() {
    let store = Arc::new(MemoryStore::new());
    let verifier = Arc::new(ScriptedVerifier::always(VerificationResult::Invalid).then(valid(30)));
    let activator = Activator::new(offline_config(), store.clone(), verifier.clone()).unwrap();

    let activated = activator.activate(KEY).await.unwrap();
    assert_eq!(activated.record.remaining_days, 30);

    let (monitor, navigator) = monitor_with(store.clone(), verifier.clone());
    let session = Session::new(store.clone(), navigator.clone());
    assert_eq!(session.cached_servers().unwrap().len(), 2);
    session.select_server("2").unwrap();

    let status = monitor.check_now().await.status().unwrap();

    assert!(status.is_deleted);
    assert!(status.should_logout);
    assert_eq!(verifier.calls(), 2);
    assert_eq!(navigator.calls(), 1);
    assert_eq!(session.license_summary().unwrap(), None);
    assert!(session.selected_server().unwrap().is_none());
}

#[tokio::test]
async fn test_rejected_activation_stores_nothing() {
    let store = Arc::new(MemoryStore::new());
    let verifier = Arc::new(ScriptedVerifier::always(VerificationResult::Invalid));
    let activator = Activator::new(offline_config(), store.clone(), verifier).unwrap();

    let err = activator.activate(KEY).await.unwrap_err();

    assert!(matches!(err, LicenseError::LicenseRejected));
    assert!(!err.is_retryable());
    assert!(store.snapshot().unwrap().is_empty());
}

#[tokio::test]
async fn test_user_logout_clears_preferences() {
    let store = licensed_store(30);
    let navigator = Arc::new(RecordingNavigator::default());
    let session = Session::new(store.clone(), navigator.clone());
    session.set_auto_connect(true).unwrap();

    session.logout().unwrap();

    assert!(store.snapshot().unwrap().is_empty());
    assert!(!session.auto_connect().unwrap());
    assert_eq!(navigator.calls(), 1);
}

#[tokio::test]
async fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let verifier = Arc::new(ScriptedVerifier::always(valid(30)));

    {
        let store = Arc::new(FileStore::with_dir(dir.path().to_path_buf()).unwrap());
        let activator = Activator::new(offline_config(), store, verifier.clone()).unwrap();
        activator.activate(KEY).await.unwrap();
    }

    let store = Arc::new(FileStore::with_dir(dir.path().to_path_buf()).unwrap());
    let record = LicenseRecord::load(&*store).unwrap().unwrap();
    assert_eq!(record.key.as_str(), KEY);
    assert_eq!(record.remaining_days, 30);

    let (monitor, navigator) = monitor_with(store, verifier.clone());
    let status = monitor.check_now().await.status().unwrap();
    assert!(status.is_valid);
    assert_eq!(navigator.calls(), 0);
}

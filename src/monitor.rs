//! License Monitor - drives reconciliation on focus and on a timer.
//!
//! The `LicenseMonitor` owns the collaborators and guarantees:
//! - At most one reconciliation in flight; overlapping triggers are dropped
//! - A single, time-bounded verification call per reconciliation
//! - No store writes or navigation once the owning screen is unmounted

use crate::client::{verify_with_timeout, LicenseVerifier};
use crate::clock::{Clock, SystemClock};
use crate::config::LicenseWatchConfig;
use crate::key::LicenseKey;
use crate::navigation::Navigator;
use crate::policy::reconcile::{reconcile, Effect, LicenseStatus};
use crate::protocol::models::VerificationResult;
use crate::store::record::LicenseRecord;
use crate::store::KeyValueStore;
use crate::LicenseError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What caused a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A screen regained focus.
    Focus,
    /// The periodic timer fired.
    Timer,
    /// Called directly through [`LicenseMonitor::check_now`].
    Manual,
}

impl Trigger {
    fn as_str(self) -> &'static str {
        match self {
            Trigger::Focus => "focus",
            Trigger::Timer => "timer",
            Trigger::Manual => "manual",
        }
    }
}

/// Result of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The check ran and its effects were applied.
    Completed(LicenseStatus),
    /// Another check was in flight (or the screen was already gone), so
    /// this trigger did nothing.
    Skipped,
    /// The check ran but the screen was unmounted before it finished; its
    /// effects were dropped.
    Discarded(LicenseStatus),
}

impl CheckOutcome {
    /// Status of the check, if it ran.
    pub fn status(&self) -> Option<LicenseStatus> {
        match self {
            CheckOutcome::Completed(status) | CheckOutcome::Discarded(status) => Some(*status),
            CheckOutcome::Skipped => None,
        }
    }
}

/// Shared monitor state.
struct MonitorInner {
    config: LicenseWatchConfig,
    store: Arc<dyn KeyValueStore>,
    verifier: Arc<dyn LicenseVerifier>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    in_flight: AtomicBool,
    shutdown: CancellationToken,
}

/// License monitor.
///
/// Create one per application and mount it on each licensed screen.
/// Cloning is cheap and clones share the in-flight guard.
#[derive(Clone)]
pub struct LicenseMonitor {
    inner: Arc<MonitorInner>,
}

impl LicenseMonitor {
    /// Create a new monitor using the system clock.
    ///
    /// # Errors
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn new(
        config: LicenseWatchConfig,
        store: Arc<dyn KeyValueStore>,
        verifier: Arc<dyn LicenseVerifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, LicenseError> {
        Self::with_clock(config, store, verifier, navigator, Arc::new(SystemClock))
    }

    /// Create a monitor with a custom clock for `verified_at` stamps.
    pub fn with_clock(
        config: LicenseWatchConfig,
        store: Arc<dyn KeyValueStore>,
        verifier: Arc<dyn LicenseVerifier>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LicenseError> {
        config.validate()?;

        Ok(Self {
            inner: Arc::new(MonitorInner {
                config,
                store,
                verifier,
                navigator,
                clock,
                in_flight: AtomicBool::new(false),
                shutdown: CancellationToken::new(),
            }),
        })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &LicenseWatchConfig {
        &self.inner.config
    }

    /// Run one reconciliation outside any screen.
    ///
    /// Returns `Skipped` after [`shutdown`](Self::shutdown).
    pub async fn check_now(&self) -> CheckOutcome {
        self.run(Trigger::Manual, &self.inner.shutdown).await
    }

    /// Mount the monitor on a screen and start its timer.
    ///
    /// The first timer check happens one full `check_interval` after
    /// mounting; call [`MountedScreen::on_focus`] for an immediate one.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn mount(&self) -> MountedScreen {
        let token = self.inner.shutdown.child_token();
        tokio::spawn(timer_task(self.clone(), token.clone()));
        debug!(
            interval_secs = self.inner.config.check_interval.as_secs(),
            "license monitor mounted"
        );

        MountedScreen {
            monitor: self.clone(),
            token,
        }
    }

    /// Stop every mounted screen's timer and refuse further checks.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    /// Whether a reconciliation is currently awaiting its verdict.
    pub fn is_checking(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// One reconciliation pass.
    async fn run(&self, trigger: Trigger, token: &CancellationToken) -> CheckOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.inner.in_flight) else {
            debug!(trigger = trigger.as_str(), "license check in flight, dropping trigger");
            return CheckOutcome::Skipped;
        };

        if token.is_cancelled() {
            return CheckOutcome::Skipped;
        }

        let store = self.inner.store.as_ref();
        let cached = match LicenseRecord::load(store) {
            Ok(cached) => cached,
            Err(LicenseError::StoreCorrupt { key }) => {
                warn!(store_key = %key, "stored license key is malformed, treating as absent");
                None
            }
            Err(e) => {
                error!(error = %e, "failed to read license record");
                return CheckOutcome::Completed(LicenseStatus::unverified(0));
            }
        };

        let reconciliation = match &cached {
            Some(record) => {
                let verification = verify_with_timeout(
                    self.inner.verifier.as_ref(),
                    &record.key,
                    self.inner.config.request_timeout,
                )
                .await;
                debug!(
                    trigger = trigger.as_str(),
                    key = %record.key.fingerprint(),
                    result = verification.label(),
                    "license verified"
                );
                reconcile(Some(record), &verification)
            }
            // Nothing to verify: no network call, straight to logout.
            None => reconcile(None, &VerificationResult::Error),
        };

        let status = reconciliation.status;

        if token.is_cancelled() {
            warn!(
                trigger = trigger.as_str(),
                "screen unmounted during license check, discarding effects"
            );
            return CheckOutcome::Discarded(status);
        }

        if status.should_logout {
            info!(
                trigger = trigger.as_str(),
                expired = status.is_expired,
                deleted = status.is_deleted,
                "license no longer valid, logging out"
            );
        } else if status.is_unverified() {
            warn!(trigger = trigger.as_str(), "license could not be verified, keeping cached state");
        }

        let verified_key = cached.as_ref().map(|record| &record.key);
        match self.apply(&reconciliation.effects, verified_key, token) {
            Ok(Applied::All) => CheckOutcome::Completed(status),
            Ok(Applied::Cancelled) => {
                warn!(
                    trigger = trigger.as_str(),
                    "screen unmounted while applying license effects, stopping"
                );
                CheckOutcome::Discarded(status)
            }
            Ok(Applied::Superseded) => {
                info!(
                    trigger = trigger.as_str(),
                    "stored license changed during check, dropping refresh"
                );
                CheckOutcome::Completed(self.stored_status())
            }
            Err(e) => {
                error!(error = %e, "failed to apply license effects");
                CheckOutcome::Completed(status)
            }
        }
    }

    /// Status of whatever is stored now, without asking the service.
    fn stored_status(&self) -> LicenseStatus {
        match LicenseRecord::load(self.inner.store.as_ref()) {
            Ok(Some(record)) => LicenseStatus::unverified(record.remaining_days),
            Ok(None) | Err(LicenseError::StoreCorrupt { .. }) => LicenseStatus::deleted(),
            Err(e) => {
                error!(error = %e, "failed to read license record");
                LicenseStatus::unverified(0)
            }
        }
    }

    /// Apply effects in order. A failed store write stops the sequence, so
    /// navigation never fires for a logout whose clear did not happen.
    ///
    /// The token is checked before every effect. The day count is refreshed
    /// only while `verified_key` is still the stored license.
    fn apply(
        &self,
        effects: &[Effect],
        verified_key: Option<&LicenseKey>,
        token: &CancellationToken,
    ) -> Result<Applied, LicenseError> {
        let store = self.inner.store.as_ref();
        for effect in effects {
            if token.is_cancelled() {
                return Ok(Applied::Cancelled);
            }
            match effect {
                Effect::ClearLicense => LicenseRecord::clear(store)?,
                Effect::PersistRemainingDays(days) => {
                    let Some(key) = verified_key else {
                        return Ok(Applied::Superseded);
                    };
                    if !LicenseRecord::save_refresh(store, key, *days, self.inner.clock.as_ref())? {
                        return Ok(Applied::Superseded);
                    }
                }
                Effect::NavigateToEntry => self.inner.navigator.replace_with_license_entry(),
            }
        }
        Ok(Applied::All)
    }
}

/// How far an effect list got.
#[derive(Debug, PartialEq, Eq)]
enum Applied {
    All,
    /// The token was cancelled before the remaining effects ran.
    Cancelled,
    /// The license was removed or replaced while the check was in flight.
    Superseded,
}

/// A licensed screen's hold on the monitor.
///
/// Dropping it (or calling [`unmount`](Self::unmount)) stops the timer and
/// discards the effects of any check still waiting on the service.
pub struct MountedScreen {
    monitor: LicenseMonitor,
    token: CancellationToken,
}

impl MountedScreen {
    /// The screen regained focus.
    pub async fn on_focus(&self) -> CheckOutcome {
        self.monitor.run(Trigger::Focus, &self.token).await
    }

    /// Whether the screen is still mounted.
    pub fn is_mounted(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Unmount the screen.
    pub fn unmount(self) {
        // Drop does the work.
    }
}

impl Drop for MountedScreen {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Periodically reconcile until the screen's token is cancelled.
async fn timer_task(monitor: LicenseMonitor, token: CancellationToken) {
    let mut interval = tokio::time::interval(monitor.inner.config.check_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                let outcome = monitor.run(Trigger::Timer, &token).await;
                debug!(?outcome, "timer license check finished");
            }
        }
    }

    debug!("license timer stopped");
}

/// Holds the in-flight flag for the duration of a check.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

//! # Licensewatch
//!
//! **License gating for client apps backed by a remote verification service.**
//!
//! Licensewatch keeps a locally stored license key in sync with the License
//! Verification Service and logs the user out when the license has been
//! deleted or has expired. It is built from two parts:
//!
//! - a pure **reconciler** ([`reconcile`]) that maps the cached record and a
//!   verification result to a [`LicenseStatus`] plus the [`Effect`]s to apply
//! - a **monitor** ([`LicenseMonitor`]) that triggers reconciliation when a
//!   screen gains focus and on a fixed interval, keeps at most one check in
//!   flight, and drops late results once the screen is unmounted
//!
//! ## Quickstart
//!
//! ```no_run
//! use licensewatch::{
//!     Activator, FileStore, HttpVerifier, LicenseMonitor, LicenseWatchConfig, NoopNavigator,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), licensewatch::LicenseError> {
//!     let config = LicenseWatchConfig::new("myapp/1.0.0", "myapp-vpn", "myapp");
//!
//!     let store = Arc::new(FileStore::new(config.store_namespace)?);
//!     let verifier = Arc::new(HttpVerifier::new(&config)?);
//!
//!     let activator = Activator::new(config.clone(), store.clone(), verifier.clone())?;
//!     activator.activate("DEMO-1234-5678-9ABC").await?;
//!
//!     let monitor = LicenseMonitor::new(config, store, verifier, Arc::new(NoopNavigator))?;
//!     let screen = monitor.mount();
//!     let outcome = screen.on_focus().await;
//!     println!("license status: {:?}", outcome.status());
//!     screen.unmount();
//!     Ok(())
//! }
//! ```
//!
//! ## Failure handling
//!
//! Only an explicit `expired` or `invalid` answer from the service logs the
//! user out. Timeouts, transport failures, 5xx responses and unreadable
//! bodies are all treated as "no verdict": cached state is kept and the next
//! trigger tries again.
//!
//! ## Configuration
//!
//! - `api_base_url` - service base URL (see [`config::resolve_api_base_url`])
//! - `check_interval` - how often a mounted screen re-checks (default 5 minutes)
//! - `request_timeout` - upper bound on one verification call (default 15 seconds)
//!
//! See [`LicenseWatchConfig`] for full documentation.

#![deny(warnings)]
#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/licensewatch/0.1.0")]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;
pub mod key;

// Protocol layer
pub mod protocol;

// Client layer
pub mod client;

// Storage layer
pub mod store;

// Policy layer
pub mod policy;

// Host integration
pub mod navigation;

// Public API
pub mod activation;
pub mod monitor;
pub mod session;

#[cfg(test)]
mod testing;

// Re-exports for public API
pub use activation::{ActivatedLicense, Activator};
pub use client::http::HttpVerifier;
pub use client::LicenseVerifier;
pub use clock::{Clock, SystemClock};
pub use config::LicenseWatchConfig;
pub use errors::LicenseError;
pub use key::LicenseKey;
pub use monitor::{CheckOutcome, LicenseMonitor, MountedScreen, Trigger};
pub use navigation::{Navigator, NoopNavigator};
pub use policy::reconcile::{reconcile, Effect, LicenseStatus, Reconciliation};
pub use protocol::models::{Server, VerificationResult};
pub use session::{LicenseSummary, Session};
pub use store::file::FileStore;
pub use store::memory::MemoryStore;
pub use store::record::LicenseRecord;
pub use store::KeyValueStore;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;

//! Navigation boundary.

/// The host app's router, reduced to the one transition licensing needs.
pub trait Navigator: Send + Sync {
    /// Replace the current screen with the license entry screen.
    ///
    /// Must be idempotent: two logouts in quick succession may both call it.
    fn replace_with_license_entry(&self);
}

/// Navigator that does nothing, for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn replace_with_license_entry(&self) {}
}

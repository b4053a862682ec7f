//! Progress hooks for menu retrieval.
//!
//! [`fetch_menus`](crate::menus::fetch_menus) reports through
//! [`ProgressCallback`] so it stays independent of any terminal; the CLI
//! draws a bar and everything else passes [`null_progress`].

use std::sync::Arc;

/// Receives progress from a per-venue loop.
pub trait ProgressCallback: Send + Sync {
    /// Number of venues that will be visited.
    fn set_total(&self, total: u64);

    /// `delta` more venues visited.
    fn inc(&self, delta: u64);

    /// Venue currently being fetched.
    fn set_message(&self, msg: String);

    /// Loop finished; `msg` summarizes the outcome.
    fn finish(&self, msg: String);
}

/// Discards all progress.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _: u64) {}

    fn inc(&self, _: u64) {}

    fn set_message(&self, _: String) {}

    fn finish(&self, _: String) {}
}

/// A shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

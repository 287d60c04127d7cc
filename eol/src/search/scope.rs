//! Per-search cancellation state shared by the supervisor and its workers.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::debug;

use crate::errors::EolError;

/// Shared state for one search run.
///
/// The dying flag only stops work that has not started yet; running workers
/// are never interrupted. The recorded error is first-writer-wins.
#[derive(Default)]
pub struct CancellationScope {
    /// Set once, on the first failure.
    dying: AtomicBool,
    /// The first recorded failure.
    error: Mutex<Option<EolError>>,
    /// Number of workers currently inside [`CancellationScope::enter`].
    live: AtomicUsize,
}

impl CancellationScope {
    /// Creates a fresh scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether new work should be skipped.
    #[must_use]
    pub fn is_dying(&self) -> bool {
        self.dying.load(Ordering::SeqCst)
    }

    /// Records a failure and marks the scope as dying.
    ///
    /// Only the first error is kept; later ones are discarded. Returns `true`
    /// if this call's error was the one recorded.
    pub fn fail(&self, error: EolError) -> bool {
        let mut slot = self.error.lock();
        let recorded = if slot.is_none() {
            *slot = Some(error);
            true
        } else {
            debug!(error = %error, "Discarding error after first failure");
            false
        };
        self.dying.store(true, Ordering::SeqCst);
        recorded
    }

    /// Whether an error has been recorded.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.lock().is_some()
    }

    /// Removes and returns the recorded error.
    pub fn take_error(&self) -> Option<EolError> {
        self.error.lock().take()
    }

    /// Registers a running worker; the returned guard retires it on drop.
    #[must_use]
    pub fn enter(&self) -> WorkerGuard<'_> {
        self.live.fetch_add(1, Ordering::SeqCst);
        WorkerGuard { scope: self }
    }

    /// Number of workers that have entered and not yet retired.
    #[must_use]
    pub fn live_workers(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for CancellationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationScope")
            .field("dying", &self.is_dying())
            .field("has_error", &self.has_error())
            .field("live", &self.live_workers())
            .finish()
    }
}

/// Marks one worker as live for as long as it is held.
#[derive(Debug)]
pub struct WorkerGuard<'a> {
    scope: &'a CancellationScope,
}

impl Drop for WorkerGuard<'_> {
    fn drop(&mut self) {
        self.scope.live.fetch_sub(1, Ordering::SeqCst);
    }
}

//! Observability hooks
//!
//! The lookup session reports renders, fetch lifecycle events and selection
//! changes to an injected [`LookupObserver`] instead of a process-wide
//! logger. [`TracingObserver`] forwards everything to `tracing` and is the
//! default; [`CountingObserver`] keeps counters that tests can assert on.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::candidate::Candidate;
use crate::error::LookupError;

/// Receives diagnostic events from a lookup session
///
/// All methods default to no-ops. Implementations must be cheap: fetch
/// callbacks run while the shared selection state is locked.
pub trait LookupObserver: Send + Sync {
    /// A view snapshot was produced for the presentation layer
    fn render(&self) {}

    /// Request `generation` was issued
    fn fetch_started(&self, _generation: u64) {}

    /// Request `generation` completed with `candidates` (possibly empty)
    fn fetch_succeeded(&self, _generation: u64, _candidates: &[Candidate]) {}

    /// Request `generation` failed; the candidate list was left alone
    fn fetch_failed(&self, _generation: u64, _error: &LookupError) {}

    /// Request `generation` was cancelled before completing
    fn fetch_aborted(&self, _generation: u64) {}

    /// The user changed the selection
    fn selection_changed(&self, _selection: Option<&Candidate>) {}
}

/// Shared observer handle
pub type SharedObserver = Arc<dyn LookupObserver>;

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LookupObserver for NoopObserver {}

/// Observer that logs through `tracing`
#[derive(Debug, Default)]
pub struct TracingObserver {
    renders: AtomicU64,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LookupObserver for TracingObserver {
    fn render(&self) {
        let count = self.renders.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!(count, "render");
    }

    fn fetch_started(&self, generation: u64) {
        tracing::debug!(generation, "fetch started");
    }

    fn fetch_succeeded(&self, generation: u64, candidates: &[Candidate]) {
        tracing::debug!(generation, count = candidates.len(), "fetch succeeded");
    }

    fn fetch_failed(&self, generation: u64, error: &LookupError) {
        tracing::warn!(generation, %error, "fetch failed");
    }

    fn fetch_aborted(&self, generation: u64) {
        tracing::debug!(generation, "fetch aborted");
    }

    fn selection_changed(&self, selection: Option<&Candidate>) {
        match selection {
            Some(c) => tracing::info!(id = c.id, name = %c.name, "selection changed"),
            None => tracing::info!("selection cleared"),
        }
    }
}

/// Counters collected by [`CountingObserver`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserverStats {
    pub renders: usize,
    pub fetches_started: usize,
    pub fetches_succeeded: usize,
    pub fetches_failed: usize,
    pub fetches_aborted: usize,
    pub selection_changes: usize,
}

/// Observer that counts events, for tests and diagnostics
#[derive(Debug, Default)]
pub struct CountingObserver {
    renders: AtomicUsize,
    fetches_started: AtomicUsize,
    fetches_succeeded: AtomicUsize,
    fetches_failed: AtomicUsize,
    fetches_aborted: AtomicUsize,
    selection_changes: AtomicUsize,
    last_error: Mutex<Option<LookupError>>,
}

impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all counters
    pub fn stats(&self) -> ObserverStats {
        ObserverStats {
            renders: self.renders.load(Ordering::SeqCst),
            fetches_started: self.fetches_started.load(Ordering::SeqCst),
            fetches_succeeded: self.fetches_succeeded.load(Ordering::SeqCst),
            fetches_failed: self.fetches_failed.load(Ordering::SeqCst),
            fetches_aborted: self.fetches_aborted.load(Ordering::SeqCst),
            selection_changes: self.selection_changes.load(Ordering::SeqCst),
        }
    }

    /// The most recent fetch error, if any
    pub fn last_error(&self) -> Option<LookupError> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LookupObserver for CountingObserver {
    fn render(&self) {
        self.renders.fetch_add(1, Ordering::SeqCst);
    }

    fn fetch_started(&self, _generation: u64) {
        self.fetches_started.fetch_add(1, Ordering::SeqCst);
    }

    fn fetch_succeeded(&self, _generation: u64, _candidates: &[Candidate]) {
        self.fetches_succeeded.fetch_add(1, Ordering::SeqCst);
    }

    fn fetch_failed(&self, _generation: u64, error: &LookupError) {
        self.fetches_failed.fetch_add(1, Ordering::SeqCst);
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(error.clone());
    }

    fn fetch_aborted(&self, _generation: u64) {
        self.fetches_aborted.fetch_add(1, Ordering::SeqCst);
    }

    fn selection_changed(&self, _selection: Option<&Candidate>) {
        self.selection_changes.fetch_add(1, Ordering::SeqCst);
    }
}

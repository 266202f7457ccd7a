//! Query controller
//!
//! Owns at most one outstanding fetch. Each settled query change calls
//! [`QueryController::issue`], which aborts the previous request before the
//! new one begins:
//!
//! ```text
//! idle -> in-flight -> { succeeded | failed | aborted }
//! ```
//!
//! # Cancellation
//!
//! A superseded request must never run its completion. Two mechanisms
//! enforce that:
//!
//! 1. The request's [`CancellationToken`] is cancelled while the shared
//!    state lock is held, and the completion re-checks the token under the
//!    same lock before applying anything.
//! 2. The spawned task is aborted, which drops the underlying fetch future
//!    (and with it the HTTP connection).
//!
//! All methods that issue requests must be called from inside a tokio
//! runtime.

use std::future::Future;
use std::time::Duration;

use lookup_core::{Candidate, LookupError, Result, SharedObserver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::source::CandidateSource;
use crate::state::SharedState;

/// Handle to the request currently in flight
struct InFlight {
    generation: u64,
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Issues candidate fetches and cancels stale ones
pub struct QueryController<S: CandidateSource> {
    source: S,
    state: SharedState,
    observer: SharedObserver,
    timeout: Option<Duration>,
    generation: u64,
    in_flight: Option<InFlight>,
}

impl<S: CandidateSource> QueryController<S> {
    pub fn new(
        source: S,
        state: SharedState,
        observer: SharedObserver,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            source,
            state,
            observer,
            timeout,
            generation: 0,
            in_flight: None,
        }
    }

    /// Generation of the most recently issued request
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Issue a fetch for a newly settled query
    ///
    /// The query only times the refetch; it is not sent to the source.
    /// Returns the generation of the new request.
    pub fn issue(&mut self, query: &str) -> u64 {
        self.cancel_in_flight();

        self.generation += 1;
        let generation = self.generation;
        tracing::debug!(generation, query, "issuing candidate fetch");

        self.state.update(|s| s.begin_request(generation));
        self.observer.fetch_started(generation);

        let token = CancellationToken::new();
        let fetch = with_timeout(self.source.fetch(), self.timeout);
        let task = tokio::spawn(complete(
            generation,
            fetch,
            token.clone(),
            self.state.clone(),
            self.observer.clone(),
        ));

        self.in_flight = Some(InFlight {
            generation,
            token,
            task,
        });

        generation
    }

    /// Cancel the in-flight request, if any
    ///
    /// Returns the generation that was aborted. A request that already
    /// completed is not reported as aborted.
    pub fn cancel_in_flight(&mut self) -> Option<u64> {
        let in_flight = self.in_flight.take()?;

        let aborted = self.state.update(|s| {
            in_flight.token.cancel();
            s.abort_request(in_flight.generation)
        });
        in_flight.task.abort();

        if aborted {
            self.observer.fetch_aborted(in_flight.generation);
            Some(in_flight.generation)
        } else {
            None
        }
    }

    /// Cancel everything and force loading off
    pub fn teardown(&mut self) {
        self.cancel_in_flight();
        self.state.update(|s| {
            let generation = s.generation();
            s.abort_request(generation);
        });
    }
}

impl<S: CandidateSource> Drop for QueryController<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Bound a fetch by the configured timeout
async fn with_timeout<F>(fetch: F, limit: Option<Duration>) -> Result<Vec<Candidate>>
where
    F: Future<Output = Result<Vec<Candidate>>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fetch)
            .await
            .unwrap_or(Err(LookupError::Timeout(limit))),
        None => fetch.await,
    }
}

/// Body of a request task: await the fetch, then apply it unless cancelled
async fn complete<F>(
    generation: u64,
    fetch: F,
    token: CancellationToken,
    state: SharedState,
    observer: SharedObserver,
) where
    F: Future<Output = Result<Vec<Candidate>>>,
{
    let outcome = tokio::select! {
        biased;
        _ = token.cancelled() => return,
        outcome = fetch => outcome,
    };

    state.update(|s| {
        // Cancellation happens under this lock, so this check is final
        if token.is_cancelled() {
            return;
        }
        match outcome {
            Ok(candidates) => {
                observer.fetch_succeeded(generation, &candidates);
                s.apply_success(generation, candidates);
            }
            Err(error) => {
                observer.fetch_failed(generation, &error);
                s.apply_failure(generation);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{flush, users, ScriptedSource};
    use lookup_core::{Candidate, CountingObserver, RequestPhase};
    use std::sync::Arc;

    fn controller(
        timeout: Option<Duration>,
    ) -> (
        QueryController<ScriptedSource>,
        ScriptedSource,
        SharedState,
        Arc<CountingObserver>,
    ) {
        let source = ScriptedSource::new();
        let state = SharedState::new();
        let observer = Arc::new(CountingObserver::new());
        let controller =
            QueryController::new(source.clone(), state.clone(), observer.clone(), timeout);
        (controller, source, state, observer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_applies_and_clears_loading() {
        let (mut controller, source, state, observer) = controller(None);

        assert_eq!(controller.issue(""), 1);
        assert!(state.lock().is_loading());

        assert!(source.resolve(0, Ok(users())));
        flush().await;

        let s = state.lock();
        assert!(!s.is_loading());
        assert_eq!(s.candidates(), users().as_slice());
        assert_eq!(s.request_phase(), RequestPhase::Succeeded);
        assert_eq!(observer.stats().fetches_succeeded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_request_applies_out_of_order() {
        let (mut controller, source, state, observer) = controller(None);

        controller.issue("a");
        controller.issue("ab");
        controller.issue("abc");
        assert_eq!(source.calls(), 3);

        // Latest resolves first...
        source.resolve(2, Ok(vec![Candidate::new(3, "Third", "c@example.com")]));
        flush().await;

        // ...older ones resolve afterwards
        source.resolve(0, Ok(vec![Candidate::new(1, "First", "a@example.com")]));
        source.resolve(1, Ok(vec![Candidate::new(2, "Second", "b@example.com")]));
        flush().await;

        let ids: Vec<i64> = state.lock().candidates().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3]);

        let stats = observer.stats();
        assert_eq!(stats.fetches_started, 3);
        assert_eq!(stats.fetches_aborted, 2);
        assert_eq!(stats.fetches_succeeded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_request_never_completes() {
        let (mut controller, source, state, observer) = controller(None);

        controller.issue("");
        source.resolve(0, Ok(users()));
        flush().await;

        controller.issue("a");
        // The response is ready before the supersede, but its task has not run
        assert!(source.resolve(1, Ok(vec![Candidate::new(9, "Stale", "s@example.com")])));
        controller.issue("al");
        flush().await;

        assert_eq!(state.lock().candidates(), users().as_slice());
        assert!(state.lock().is_loading());
        assert_eq!(observer.stats().fetches_succeeded, 1);

        // Resolving the aborted call afterwards has nowhere to go
        assert!(!source.resolve(1, Ok(Vec::new())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolving_after_abort_mutates_nothing() {
        let (mut controller, source, state, observer) = controller(None);

        controller.issue("");
        controller.cancel_in_flight();
        flush().await;

        let before = state.lock().clone();
        source.resolve(0, Ok(users()));
        flush().await;

        let after = state.lock();
        assert_eq!(after.candidates(), before.candidates());
        assert_eq!(after.request_phase(), RequestPhase::Aborted);
        assert_eq!(observer.stats().fetches_succeeded, 0);
        assert_eq!(observer.stats().fetches_failed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_success_keeps_list() {
        let (mut controller, source, state, _observer) = controller(None);

        controller.issue("");
        source.resolve(0, Ok(users()));
        flush().await;

        controller.issue("zzz");
        source.resolve(1, Ok(Vec::new()));
        flush().await;

        let s = state.lock();
        assert!(!s.is_loading());
        assert_eq!(s.candidates(), users().as_slice());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_reported_not_applied() {
        let (mut controller, source, state, observer) = controller(None);

        controller.issue("");
        source.resolve(0, Ok(users()));
        flush().await;

        controller.issue("x");
        source.resolve(
            1,
            Err(LookupError::Malformed("expected a JSON array".to_string())),
        );
        flush().await;

        let s = state.lock();
        assert!(!s.is_loading());
        assert_eq!(s.request_phase(), RequestPhase::Failed);
        assert_eq!(s.candidates().len(), 3);
        assert!(matches!(
            observer.last_error(),
            Some(LookupError::Malformed(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_request() {
        let (mut controller, _source, state, observer) =
            controller(Some(Duration::from_millis(100)));

        controller.issue("");
        tokio::time::sleep(Duration::from_millis(99)).await;
        assert!(state.lock().is_loading());

        tokio::time::sleep(Duration::from_millis(2)).await;
        flush().await;

        assert!(!state.lock().is_loading());
        assert_eq!(
            observer.last_error(),
            Some(LookupError::Timeout(Duration::from_millis(100)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_forces_loading_off() {
        let (mut controller, source, state, observer) = controller(None);

        controller.issue("");
        controller.teardown();
        assert!(!state.lock().is_loading());
        assert_eq!(observer.stats().fetches_aborted, 1);

        source.resolve(0, Ok(users()));
        flush().await;
        assert!(state.lock().candidates().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_in_flight() {
        let (mut controller, source, state, _observer) = controller(None);

        controller.issue("");
        drop(controller);
        assert!(!state.lock().is_loading());

        flush().await;
        assert!(!source.resolve(0, Ok(users())));
        assert!(state.lock().candidates().is_empty());
    }
}

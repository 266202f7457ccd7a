//! Lookup session
//!
//! [`Lookup`] is one interactive control: it wires the debouncer, the query
//! controller and the shared selection state behind a small explicit
//! interface (`set_query`, `open`, `close`, `select`, `teardown`). A
//! presentation layer either calls those methods directly and drives
//! [`Lookup::tick`] from its own timer, or hands a channel of
//! [`LookupInput`]s to [`Lookup::run`].
//!
//! # Example
//!
//! ```ignore
//! use lookup_client::{HttpSource, Lookup, LookupInput};
//! use lookup_core::LookupConfig;
//!
//! let config = LookupConfig::default();
//! let lookup = Lookup::new(HttpSource::from_config(&config)?, &config);
//!
//! let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
//! tokio::spawn(lookup.run(rx, |view| println!("{} options", view.options.len())));
//!
//! tx.send(LookupInput::Query("alice".into()))?;
//! tx.send(LookupInput::Open)?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use lookup_core::{
    Candidate, CandidateId, Debouncer, LookupConfig, LookupView, SharedObserver, TracingObserver,
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::controller::QueryController;
use crate::source::CandidateSource;
use crate::state::SharedState;

/// Input accepted by [`Lookup::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupInput {
    /// The input text changed
    Query(String),
    /// Open the options panel
    Open,
    /// Close the options panel
    Close,
    /// Select a candidate, or clear the selection
    Select(Option<Candidate>),
    /// Select the listed candidate with this id
    SelectId(CandidateId),
    /// End the session
    Teardown,
}

/// One debounced, cancellable lookup control
pub struct Lookup<S: CandidateSource> {
    query: Debouncer<String>,
    controller: QueryController<S>,
    state: SharedState,
    observer: SharedObserver,
    mounted: bool,
}

impl<S: CandidateSource> Lookup<S> {
    /// Create a session that logs through `tracing`
    pub fn new(source: S, config: &LookupConfig) -> Self {
        Self::with_observer(source, config, Arc::new(TracingObserver::new()))
    }

    /// Create a session reporting to `observer`
    pub fn with_observer(source: S, config: &LookupConfig, observer: SharedObserver) -> Self {
        let state = SharedState::new();
        let controller =
            QueryController::new(source, state.clone(), observer.clone(), config.timeout());
        Self {
            query: Debouncer::new(String::new(), config.delay()),
            controller,
            state,
            observer,
            mounted: false,
        }
    }

    /// Shared state handle (for renderers running elsewhere)
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn source(&self) -> &S {
        self.controller.source()
    }

    /// The last settled query
    pub fn settled_query(&self) -> &str {
        self.query.settled()
    }

    /// When the pending query settles, if one is pending
    pub fn deadline(&self) -> Option<Instant> {
        self.query.deadline()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Perform the initial load for the current settled query
    pub fn mount(&mut self) {
        if self.mounted || self.query.is_torn_down() {
            return;
        }
        self.mounted = true;
        let settled = self.query.settled().clone();
        self.controller.issue(&settled);
    }

    // =========================================================================
    // PRESENTATION INPUTS
    // =========================================================================

    /// The user edited the input text
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.set_query_at(text, now());
    }

    /// [`set_query`](Self::set_query) with an explicit timestamp
    pub fn set_query_at(&mut self, text: impl Into<String>, at: Instant) {
        if self.query.is_torn_down() {
            return;
        }
        let text = text.into();
        self.state.update(|s| s.set_input(text.clone()));
        self.query.push(text, at);
    }

    pub fn open(&mut self) {
        self.state.update(|s| s.open());
    }

    pub fn close(&mut self) {
        self.state.update(|s| s.close());
    }

    /// Replace or clear the selection
    pub fn select(&mut self, candidate: Option<Candidate>) {
        let observer = &self.observer;
        self.state.update(|s| {
            if s.select(candidate) {
                observer.selection_changed(s.selection());
            }
        });
    }

    /// Select the listed candidate with `id`; false if it is not listed
    pub fn select_id(&mut self, id: CandidateId) -> bool {
        let found = self.state.lock().find(id).cloned();
        match found {
            Some(candidate) => {
                self.select(Some(candidate));
                true
            }
            None => false,
        }
    }

    /// Apply one input; returns false for [`LookupInput::Teardown`]
    pub fn handle(&mut self, input: LookupInput) -> bool {
        match input {
            LookupInput::Query(text) => self.set_query(text),
            LookupInput::Open => self.open(),
            LookupInput::Close => self.close(),
            LookupInput::Select(candidate) => self.select(candidate),
            LookupInput::SelectId(id) => {
                if !self.select_id(id) {
                    tracing::debug!(id, "no listed candidate with this id");
                }
            }
            LookupInput::Teardown => {
                self.teardown();
                return false;
            }
        }
        true
    }

    // =========================================================================
    // TIMING
    // =========================================================================

    /// Settle the query if its quiet period has passed
    ///
    /// Issues a fetch when the settled value changed. Returns whether it did.
    pub fn tick(&mut self) -> bool {
        self.tick_at(now())
    }

    /// [`tick`](Self::tick) with an explicit timestamp
    pub fn tick_at(&mut self, at: Instant) -> bool {
        let Some(settled) = self.query.poll(at).cloned() else {
            return false;
        };
        tracing::debug!(query = %settled, "query settled");
        if self.mounted {
            self.controller.issue(&settled);
        }
        true
    }

    // =========================================================================
    // PRESENTATION OUTPUT
    // =========================================================================

    /// Snapshot for the presentation layer (counts as a render)
    pub fn view(&self) -> LookupView {
        self.observer.render();
        self.state.view()
    }

    /// End the session
    ///
    /// Synchronously discards the pending debounce emission, cancels the
    /// in-flight request, clears the candidate list and closes the panel.
    pub fn teardown(&mut self) {
        self.query.cancel();
        self.controller.teardown();
        self.state.update(|s| s.teardown());
        self.mounted = false;
    }

    pub fn is_torn_down(&self) -> bool {
        self.query.is_torn_down()
    }

    /// Drive the session until the input channel closes or a teardown arrives
    ///
    /// Mounts, renders once, then re-renders through `render` whenever the
    /// state changes: on user input, when the query settles and when a fetch
    /// completes. Tears down before returning.
    pub async fn run<F>(mut self, mut inputs: UnboundedReceiver<LookupInput>, mut render: F)
    where
        F: FnMut(&LookupView),
    {
        self.mount();
        self.state.take_dirty();
        render(&self.view());

        let state = self.state.clone();
        loop {
            let deadline = self.query.deadline();

            tokio::select! {
                input = inputs.recv() => match input {
                    Some(input) => {
                        if !self.handle(input) {
                            break;
                        }
                    }
                    None => break,
                },
                _ = sleep_until(deadline) => {
                    self.tick();
                }
                _ = state.changed() => {}
            }

            if state.take_dirty() {
                render(&self.view());
            }
        }

        if !self.is_torn_down() {
            self.teardown();
        }
        tracing::debug!("lookup session ended");
    }
}

/// Current time on the tokio clock (virtual when the runtime is paused)
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

//! Request phases
//!
//! Every fetch goes through `Idle -> InFlight -> {Succeeded | Failed | Aborted}`.
//! Requests are numbered by a generation counter; only the request with the
//! current generation may move the tracker out of `InFlight`.

/// Lifecycle phase of the most recently issued request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestPhase {
    /// Nothing issued yet
    #[default]
    Idle,
    /// Issued, waiting for the endpoint
    InFlight,
    /// Completed with a candidate list
    Succeeded,
    /// Completed with an error
    Failed,
    /// Cancelled before completion
    Aborted,
}

impl RequestPhase {
    /// Whether the request reached a terminal phase
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestPhase::Succeeded | RequestPhase::Failed | RequestPhase::Aborted
        )
    }

    /// Coarse fetch state shown to the presentation layer
    pub fn fetch_state(self) -> FetchState {
        match self {
            RequestPhase::Idle => FetchState::Idle,
            RequestPhase::InFlight => FetchState::InFlight,
            _ => FetchState::Settled,
        }
    }
}

/// Coarse fetch state: idle, in-flight, or settled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Idle,
    InFlight,
    Settled,
}

/// Generation-tagged phase of the current request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestTracker {
    generation: u64,
    phase: RequestPhase,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the most recently issued request (0 before the first)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    /// True exactly while the latest request is in flight
    pub fn is_loading(&self) -> bool {
        self.phase == RequestPhase::InFlight
    }

    /// Start tracking a new request
    ///
    /// Generations must increase; a stale or repeated generation is ignored.
    pub fn begin(&mut self, generation: u64) -> bool {
        if generation <= self.generation && self.phase != RequestPhase::Idle {
            return false;
        }
        self.generation = generation;
        self.phase = RequestPhase::InFlight;
        true
    }

    /// Move request `generation` to a terminal phase
    ///
    /// Returns false (and changes nothing) if `generation` is not the current
    /// request, the request already settled, or `phase` is not terminal.
    pub fn settle(&mut self, generation: u64, phase: RequestPhase) -> bool {
        if generation != self.generation
            || self.phase != RequestPhase::InFlight
            || !phase.is_terminal()
        {
            return false;
        }
        self.phase = phase;
        true
    }
}

//! Lookup Core
//!
//! Runtime-free building blocks of a searchable selection control backed by a
//! remote candidate list:
//!
//! - **Candidates**: immutable records matched by identifier
//! - **Debouncer**: settles rapidly changing input after a quiet period
//! - **Selection State**: candidates, selection, open/loading flags, rebuild flag
//! - **Request Phases**: generation-tagged `Idle -> InFlight -> Settled` tracking
//! - **Observer**: injectable hooks for render counts and fetch diagnostics
//! - **Config**: endpoint and timing, loadable from TOML
//!
//! The async pieces (HTTP source, query controller, session loop) live in
//! `lookup_client`.
//!
//! # Example
//!
//! ```rust
//! use lookup_core::{Candidate, SelectionState};
//!
//! let mut state = SelectionState::new();
//! state.begin_request(1);
//! state.apply_success(1, vec![Candidate::new(2, "Ervin Howell", "Shanna@melissa.tv")]);
//!
//! let ervin = state.find(2).cloned();
//! state.select(ervin);
//!
//! // A refetch returns a new instance; identity is by id
//! assert!(state.is_selected(&Candidate::new(2, "Ervin H.", "Shanna@melissa.tv")));
//! ```

pub mod candidate;
pub mod config;
pub mod debounce;
pub mod error;
pub mod observer;
pub mod request;
pub mod selection;

pub use candidate::{Candidate, CandidateId};
pub use config::{LookupConfig, DEFAULT_ENDPOINT};
pub use debounce::{Debouncer, DEFAULT_DELAY};
pub use error::{LookupError, Result};
pub use observer::{
    CountingObserver, LookupObserver, NoopObserver, ObserverStats, SharedObserver,
    TracingObserver,
};
pub use request::{FetchState, RequestPhase, RequestTracker};
pub use selection::{LookupView, SelectionState};

//! Lookup Client
//!
//! Async half of the lookup control: fetches the candidate list over HTTP,
//! keeps at most one request in flight, and drives a debounced session loop
//! on top of the runtime-free pieces in `lookup_core`.
//!
//! # Example
//!
//! ```ignore
//! use lookup_client::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = LookupConfig::default();
//!     let mut lookup = Lookup::new(HttpSource::from_config(&config)?, &config);
//!
//!     lookup.mount();
//!     lookup.set_query("er");
//!     lookup.open();
//!
//!     tokio::time::sleep(config.delay()).await;
//!     lookup.tick();
//!
//!     lookup.state().changed().await;
//!     for option in lookup.view().options {
//!         println!("{}", option.label());
//!     }
//!     Ok(())
//! }
//! ```

mod controller;
mod http;
mod session;
mod source;
mod state;

#[cfg(test)]
mod mock;


pub use controller::QueryController;
pub use http::HttpSource;
pub use session::{Lookup, LookupInput};
pub use source::{decode_candidates, CandidateSource};
pub use state::SharedState;

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::http::HttpSource;
    pub use crate::session::{Lookup, LookupInput};
    pub use crate::source::CandidateSource;
    pub use crate::state::SharedState;

    pub use lookup_core::{
        Candidate, CandidateId, LookupConfig, LookupError, LookupView, Result,
    };
}

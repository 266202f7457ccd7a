//! Scripted candidate source for tests
//!
//! Every `fetch` call parks a oneshot receiver; the test decides when, in
//! which order, and with what each call resolves.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use lookup_core::{Candidate, LookupError, Result};
use tokio::sync::oneshot;

type Responder = oneshot::Sender<Result<Vec<Candidate>>>;

#[derive(Clone, Default)]
pub(crate) struct ScriptedSource {
    responders: Arc<Mutex<Vec<Option<Responder>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of fetches issued so far
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Resolve fetch number `call` (0-based)
    ///
    /// Returns false if the call does not exist, was already resolved, or
    /// its future has been dropped.
    pub(crate) fn resolve(&self, call: usize, result: Result<Vec<Candidate>>) -> bool {
        let responder = self
            .responders
            .lock()
            .unwrap()
            .get_mut(call)
            .and_then(Option::take);
        match responder {
            Some(tx) => tx.send(result).is_ok(),
            None => false,
        }
    }
}

impl crate::source::CandidateSource for ScriptedSource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<Candidate>>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        self.responders.lock().unwrap().push(Some(tx));
        self.calls.fetch_add(1, Ordering::SeqCst);

        async move {
            rx.await
                .unwrap_or_else(|_| Err(LookupError::Network("responder dropped".to_string())))
        }
    }
}

pub(crate) fn users() -> Vec<Candidate> {
    vec![
        Candidate::new(1, "Leanne Graham", "Sincere@april.biz"),
        Candidate::new(2, "Ervin Howell", "Shanna@melissa.tv"),
        Candidate::new(3, "Clementine Bauch", "Nathan@yesenia.net"),
    ]
}

/// Let spawned tasks run to their next suspension point
pub(crate) async fn flush() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

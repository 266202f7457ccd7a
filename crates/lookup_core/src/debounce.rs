//! Debounced values
//!
//! A [`Debouncer`] turns a rapidly changing input into a settled value that
//! only moves once the input has stayed unchanged for the configured delay.
//! Time is passed in by the caller, so the debouncer itself never sleeps and
//! never touches a runtime; the session loop sleeps until [`Debouncer::deadline`]
//! and then calls [`Debouncer::poll`].
//!
//! # Example
//!
//! ```rust
//! use lookup_core::debounce::Debouncer;
//! use std::time::{Duration, Instant};
//!
//! let start = Instant::now();
//! let mut query = Debouncer::new(String::new(), Duration::from_millis(500));
//!
//! query.push("al".to_string(), start);
//! query.push("alice".to_string(), start + Duration::from_millis(200));
//!
//! // Still inside the quiet window of the last keystroke
//! assert_eq!(query.poll(start + Duration::from_millis(600)), None);
//!
//! // 500ms after "alice" the value settles
//! let settled = query.poll(start + Duration::from_millis(700)).cloned();
//! assert_eq!(settled.as_deref(), Some("alice"));
//! ```

use std::time::{Duration, Instant};

/// Delay used when none (or zero) is configured
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// An emission waiting for its quiet window to pass
#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    due_at: Instant,
}

/// Converts a changing input into a delayed, settled value
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    settled: T,
    pending: Option<Pending<T>>,
    torn_down: bool,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    /// Create a debouncer whose settled value starts at `initial`
    ///
    /// A zero delay counts as unspecified and falls back to [`DEFAULT_DELAY`].
    pub fn new(initial: T, delay: Duration) -> Self {
        let delay = if delay.is_zero() { DEFAULT_DELAY } else { delay };
        Self {
            delay,
            settled: initial,
            pending: None,
            torn_down: false,
        }
    }

    /// Create a debouncer with the default 500ms delay
    pub fn with_default_delay(initial: T) -> Self {
        Self::new(initial, DEFAULT_DELAY)
    }

    /// The quiet period an input must survive before it settles
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The current settled value
    pub fn settled(&self) -> &T {
        &self.settled
    }

    /// Record a new input value observed at `now`
    ///
    /// A value that differs from the latest one discards any scheduled
    /// emission and schedules a fresh one `delay` after `now`. Repeating the
    /// latest value (pending, or settled when nothing is pending) keeps the
    /// current schedule. Ignored after [`cancel`](Self::cancel).
    pub fn push(&mut self, value: T, now: Instant) {
        if self.torn_down {
            return;
        }
        let latest = match &self.pending {
            Some(pending) => &pending.value,
            None => &self.settled,
        };
        if *latest == value {
            return;
        }
        self.pending = Some(Pending {
            value,
            due_at: now + self.delay,
        });
    }

    /// When the pending emission fires, if one is scheduled
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due_at)
    }

    /// Whether an emission is scheduled
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Fire the pending emission if it is due at `now`
    ///
    /// Returns the new settled value only when it differs from the previous
    /// one; an input that settles back to the same value is not a change.
    pub fn poll(&mut self, now: Instant) -> Option<&T> {
        let due = matches!(&self.pending, Some(p) if p.due_at <= now);
        if !due {
            return None;
        }

        let pending = self.pending.take()?;
        if pending.value == self.settled {
            return None;
        }

        self.settled = pending.value;
        Some(&self.settled)
    }

    /// Discard the pending emission for good
    ///
    /// Called on teardown. Nothing fires afterwards, including values
    /// pushed later.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.torn_down = true;
    }

    /// Whether [`cancel`](Self::cancel) has been called
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

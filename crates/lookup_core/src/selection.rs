//! Selection state
//!
//! Everything the presentation layer reads lives in [`SelectionState`]: the
//! typed text, the candidate list, the chosen candidate, the open flag and
//! the phase of the latest request (from which `loading` is derived).
//!
//! Mutations mark the state dirty. A renderer calls [`SelectionState::take_dirty`]
//! once per frame and only redraws when it returns true, the same way a
//! rebuild flag is consumed by a UI event loop.
//!
//! Fetch results are applied through generation-checked methods so that a
//! request which is no longer current can never touch the candidate list.

use crate::candidate::{Candidate, CandidateId};
use crate::request::{FetchState, RequestPhase, RequestTracker};

/// UI-visible state of one lookup control
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    input: String,
    candidates: Vec<Candidate>,
    selection: Option<Candidate>,
    open: bool,
    request: RequestTracker,
    dirty: bool,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // USER INPUT
    // =========================================================================

    /// Replace the raw input text
    pub fn set_input(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.input != text {
            self.input = text;
            self.dirty = true;
        }
    }

    /// Show the options panel (never triggers a fetch)
    pub fn open(&mut self) {
        if !self.open {
            self.open = true;
            self.dirty = true;
        }
    }

    /// Hide the options panel
    pub fn close(&mut self) {
        if self.open {
            self.open = false;
            self.dirty = true;
        }
    }

    /// Replace or clear the selection
    ///
    /// Returns true when the selection actually changed (by identity).
    pub fn select(&mut self, candidate: Option<Candidate>) -> bool {
        let unchanged = match (&self.selection, &candidate) {
            (None, None) => true,
            (Some(current), Some(next)) => current.same_as(next),
            _ => false,
        };
        self.selection = candidate;
        if !unchanged {
            self.dirty = true;
        }
        !unchanged
    }

    // =========================================================================
    // READS
    // =========================================================================

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn selection(&self) -> Option<&Candidate> {
        self.selection.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// True exactly while the latest request is in flight
    pub fn is_loading(&self) -> bool {
        self.request.is_loading()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.request.phase().fetch_state()
    }

    pub fn request_phase(&self) -> RequestPhase {
        self.request.phase()
    }

    /// Generation of the latest request (0 before the first)
    pub fn generation(&self) -> u64 {
        self.request.generation()
    }

    /// Look up a candidate in the current list by id
    pub fn find(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    /// Whether `candidate` is the current selection (identifier equality)
    pub fn is_selected(&self, candidate: &Candidate) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|selected| selected.same_as(candidate))
    }

    /// Candidates whose label contains the typed text
    pub fn visible(&self) -> Vec<&Candidate> {
        self.candidates
            .iter()
            .filter(|c| c.matches(&self.input))
            .collect()
    }

    /// Build a snapshot for the presentation layer
    pub fn view(&self) -> LookupView {
        let options: Vec<Candidate> = self.visible().into_iter().cloned().collect();
        let loading = self.is_loading();
        LookupView {
            input: self.input.clone(),
            no_options: self.open && !loading && options.is_empty(),
            candidates: self.candidates.clone(),
            options,
            selection: self.selection.clone(),
            open: self.open,
            loading,
            fetch_state: self.fetch_state(),
        }
    }

    // =========================================================================
    // REBUILD FLAG
    // =========================================================================

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and clear the rebuild flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // =========================================================================
    // FETCH LIFECYCLE
    // =========================================================================

    /// Mark request `generation` as in flight (loading becomes true)
    pub fn begin_request(&mut self, generation: u64) -> bool {
        let started = self.request.begin(generation);
        if started {
            self.dirty = true;
        }
        started
    }

    /// Complete request `generation` with a candidate list
    ///
    /// A non-empty list replaces the candidates wholesale; an empty list
    /// leaves the previous candidates in place. Either way loading ends.
    /// Returns false without touching anything if the request is not current.
    pub fn apply_success(&mut self, generation: u64, candidates: Vec<Candidate>) -> bool {
        if !self.request.settle(generation, RequestPhase::Succeeded) {
            return false;
        }
        if !candidates.is_empty() {
            self.candidates = candidates;
        }
        self.dirty = true;
        true
    }

    /// Complete request `generation` with a failure; candidates are untouched
    pub fn apply_failure(&mut self, generation: u64) -> bool {
        let settled = self.request.settle(generation, RequestPhase::Failed);
        if settled {
            self.dirty = true;
        }
        settled
    }

    /// Mark request `generation` as cancelled
    pub fn abort_request(&mut self, generation: u64) -> bool {
        let settled = self.request.settle(generation, RequestPhase::Aborted);
        if settled {
            self.dirty = true;
        }
        settled
    }

    /// Tear the control down
    ///
    /// Aborts the in-flight request (if any), clears the candidate list and
    /// closes the panel. The selection is kept. Returns the generation of the
    /// request that was aborted.
    pub fn teardown(&mut self) -> Option<u64> {
        let generation = self.request.generation();
        let aborted = self.abort_request(generation).then_some(generation);
        if !self.candidates.is_empty() {
            self.candidates.clear();
            self.dirty = true;
        }
        self.close();
        aborted
    }
}

/// Snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupView {
    /// Current input text
    pub input: String,
    /// Full candidate list from the last applied fetch
    pub candidates: Vec<Candidate>,
    /// Candidates matching the input text, in list order
    pub options: Vec<Candidate>,
    /// Current selection
    pub selection: Option<Candidate>,
    /// Whether the options panel is open
    pub open: bool,
    /// Whether a request is in flight
    pub loading: bool,
    pub fetch_state: FetchState,
    /// Open, not loading, and nothing to show
    pub no_options: bool,
}

impl LookupView {
    /// Whether `candidate` is the selected one (identifier equality)
    pub fn is_selected(&self, candidate: &Candidate) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|selected| selected.same_as(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Vec<Candidate> {
        vec![
            Candidate::new(1, "Leanne Graham", "Sincere@april.biz"),
            Candidate::new(2, "Ervin Howell", "Shanna@melissa.tv"),
            Candidate::new(3, "Clementine Bauch", "Nathan@yesenia.net"),
        ]
    }

    #[test]
    fn test_initial_state() {
        let state = SelectionState::new();
        assert_eq!(state.input(), "");
        assert!(state.candidates().is_empty());
        assert!(state.selection().is_none());
        assert!(!state.is_open());
        assert!(!state.is_loading());
        assert_eq!(state.fetch_state(), FetchState::Idle);
    }

    #[test]
    fn test_success_replaces_list() {
        let mut state = SelectionState::new();
        state.begin_request(1);
        assert!(state.is_loading());

        assert!(state.apply_success(1, users()));
        assert!(!state.is_loading());
        assert_eq!(state.candidates().len(), 3);
        assert_eq!(state.fetch_state(), FetchState::Settled);
    }

    #[test]
    fn test_empty_success_keeps_previous_list() {
        let mut state = SelectionState::new();
        state.begin_request(1);
        state.apply_success(1, users());

        state.begin_request(2);
        assert!(state.apply_success(2, Vec::new()));
        assert!(!state.is_loading());
        assert_eq!(state.candidates(), users().as_slice());
    }

    #[test]
    fn test_failure_leaves_list_untouched() {
        let mut state = SelectionState::new();
        state.begin_request(1);
        state.apply_success(1, users());

        state.begin_request(2);
        assert!(state.apply_failure(2));
        assert!(!state.is_loading());
        assert_eq!(state.request_phase(), RequestPhase::Failed);
        assert_eq!(state.candidates().len(), 3);
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let mut state = SelectionState::new();
        state.begin_request(1);
        state.abort_request(1);
        state.begin_request(2);

        assert!(!state.apply_success(1, users()));
        assert!(state.candidates().is_empty());
        assert!(state.is_loading());
    }

    #[test]
    fn test_selection_survives_refetch_by_id() {
        let mut state = SelectionState::new();
        state.begin_request(1);
        state.apply_success(1, users());

        let chosen = state.find(3).cloned();
        assert!(state.select(chosen));

        // New instances, same id, different name
        state.begin_request(2);
        state.apply_success(
            2,
            vec![
                Candidate::new(3, "Clementine B.", "Nathan@yesenia.net"),
                Candidate::new(4, "Patricia Lebsack", "Julianne.OConner@kory.org"),
            ],
        );

        let fresh = state.find(3).unwrap().clone();
        assert!(state.is_selected(&fresh));
        assert_eq!(state.selection().unwrap().name, "Clementine Bauch");
        assert!(!state.is_selected(state.find(4).unwrap()));
    }

    #[test]
    fn test_select_same_id_is_not_a_change() {
        let mut state = SelectionState::new();
        assert!(state.select(Some(users()[1].clone())));
        assert!(!state.select(Some(Candidate::new(2, "Ervin", "e@example.com"))));
        assert!(state.select(None));
        assert!(!state.select(None));
    }

    #[test]
    fn test_open_close_and_dirty_flag() {
        let mut state = SelectionState::new();
        assert!(!state.take_dirty());

        state.open();
        assert!(state.is_open());
        assert!(state.take_dirty());
        assert!(!state.take_dirty());

        // Opening twice is not a change
        state.open();
        assert!(!state.is_dirty());

        state.close();
        assert!(!state.is_open());
        assert!(state.take_dirty());

        // Opening never starts a request
        assert_eq!(state.fetch_state(), FetchState::Idle);
    }

    #[test]
    fn test_visible_filters_by_name() {
        let mut state = SelectionState::new();
        state.begin_request(1);
        state.apply_success(1, users());

        state.set_input("er");
        let names: Vec<&str> = state.visible().iter().map(|c| c.label()).collect();
        assert_eq!(names, vec!["Ervin Howell"]);

        state.set_input("");
        assert_eq!(state.visible().len(), 3);
    }

    #[test]
    fn test_view_no_options() {
        let mut state = SelectionState::new();
        state.open();
        state.set_input("zzz");
        assert!(state.view().no_options);

        state.begin_request(1);
        assert!(!state.view().no_options);
        assert!(state.view().loading);
    }

    #[test]
    fn test_teardown() {
        let mut state = SelectionState::new();
        state.begin_request(1);
        state.apply_success(1, users());
        state.select(Some(users()[0].clone()));
        state.open();
        state.begin_request(2);

        assert_eq!(state.teardown(), Some(2));
        assert!(!state.is_loading());
        assert!(state.candidates().is_empty());
        assert!(!state.is_open());
        assert_eq!(state.request_phase(), RequestPhase::Aborted);
        assert_eq!(state.selection().map(|c| c.id), Some(1));

        // Nothing in flight the second time
        assert_eq!(state.teardown(), None);
    }
}

//! Candidate records fetched from the remote source

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Identifier of a candidate record
pub type CandidateId = i64;

/// One selectable record
///
/// Candidates are immutable once received. Two candidates denote the same
/// logical record when their ids match, regardless of name or email, so a
/// refetch that returns fresh instances does not break an existing selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique identifier
    pub id: CandidateId,
    /// Display name, also the text options are filtered by
    pub name: String,
    /// Email address (carried along, never matched against)
    pub email: String,
}

impl Candidate {
    /// Create a new candidate
    pub fn new(id: CandidateId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Identity comparison used for selection matching
    pub fn same_as(&self, other: &Candidate) -> bool {
        self.id == other.id
    }

    /// Label shown for this candidate in the options panel
    pub fn label(&self) -> &str {
        &self.name
    }

    /// Check if this candidate's label contains the query
    ///
    /// Ignores case and accents, so "jose" matches "José".
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        fold(&self.name).contains(&fold(query))
    }
}

/// Lowercase with diacritics stripped (NFD, combining marks dropped)
fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

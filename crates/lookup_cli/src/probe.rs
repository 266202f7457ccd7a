//! Probe command - check that an endpoint can back a lookup control
//!
//! Performs one fetch and grades it: did the endpoint answer, with a success
//! status, with a list of candidate records, and is that list usable for
//! selection by id.

use std::collections::HashSet;
use std::time::Duration;

use lookup_client::{CandidateSource, HttpSource};
use lookup_core::{Candidate, CandidateId, LookupConfig, LookupError, Result};

/// Timeout used when the configuration sets none
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

// ANSI color codes
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";
    pub const BOLD: &str = "\x1b[1m";
}

/// Outcome of one check, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verdict {
    /// Not run because an earlier check failed
    Skipped,
    Pass,
    Warn,
    Fail,
}

impl Verdict {
    fn marker(self) -> String {
        let (color, mark) = match self {
            Verdict::Skipped => (colors::GRAY, "-"),
            Verdict::Pass => (colors::GREEN, "✓"),
            Verdict::Warn => (colors::YELLOW, "!"),
            Verdict::Fail => (colors::RED, "✗"),
        };
        format!("{}{}{}", color, mark, colors::RESET)
    }
}

#[derive(Debug, Clone)]
pub struct Check {
    pub name: &'static str,
    pub verdict: Verdict,
    pub detail: String,
    pub hint: Option<&'static str>,
}

impl Check {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            verdict: Verdict::Pass,
            detail: detail.into(),
            hint: None,
        }
    }

    fn warn(name: &'static str, detail: impl Into<String>, hint: &'static str) -> Self {
        Self {
            name,
            verdict: Verdict::Warn,
            detail: detail.into(),
            hint: Some(hint),
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: &'static str) -> Self {
        Self {
            name,
            verdict: Verdict::Fail,
            detail: detail.into(),
            hint: Some(hint),
        }
    }

    fn skipped(name: &'static str) -> Self {
        Self {
            name,
            verdict: Verdict::Skipped,
            detail: String::new(),
            hint: None,
        }
    }
}

/// A titled group of checks
#[derive(Debug)]
pub struct Section {
    pub title: &'static str,
    pub checks: Vec<Check>,
}

impl Section {
    /// Most severe verdict in the section
    pub fn verdict(&self) -> Verdict {
        self.checks
            .iter()
            .map(|c| c.verdict)
            .max()
            .unwrap_or(Verdict::Pass)
    }
}

/// Everything one probe found
#[derive(Debug)]
pub struct ProbeReport {
    pub sections: Vec<Section>,
}

impl ProbeReport {
    fn count(&self, verdict: Verdict) -> usize {
        self.sections
            .iter()
            .flat_map(|s| &s.checks)
            .filter(|c| c.verdict == verdict)
            .count()
    }

    /// Whether any check failed
    pub fn failed(&self) -> bool {
        self.count(Verdict::Fail) > 0
    }

    /// Print the report to stdout
    pub fn print(&self, endpoint: &str) {
        println!("{}Probing {}{}", colors::BOLD, endpoint, colors::RESET);
        println!();

        for section in &self.sections {
            println!(
                "{} {}{}{}",
                section.verdict().marker(),
                colors::BOLD,
                section.title,
                colors::RESET
            );
            for check in &section.checks {
                if check.verdict == Verdict::Skipped {
                    println!("  {} {} (skipped)", check.verdict.marker(), check.name);
                    continue;
                }
                println!("  {} {}: {}", check.verdict.marker(), check.name, check.detail);
                if let Some(hint) = check.hint {
                    println!("      {}{}{}", colors::GRAY, hint, colors::RESET);
                }
            }
            println!();
        }

        let (passed, warned, failed) = (
            self.count(Verdict::Pass),
            self.count(Verdict::Warn),
            self.count(Verdict::Fail),
        );
        let color = if failed > 0 {
            colors::RED
        } else if warned > 0 {
            colors::YELLOW
        } else {
            colors::GREEN
        };
        println!(
            "{}{} passed, {} warned, {} failed{}",
            color, passed, warned, failed, colors::RESET
        );
    }
}

/// Run all probe checks against the configured endpoint
pub async fn run_probe(config: &LookupConfig) -> ProbeReport {
    let limit = config.timeout().unwrap_or(PROBE_TIMEOUT);
    let outcome = match HttpSource::from_config(config) {
        Ok(source) => {
            tracing::debug!(url = %source.url(), "probing endpoint");
            tokio::time::timeout(limit, source.fetch())
                .await
                .unwrap_or(Err(LookupError::Timeout(limit)))
        }
        Err(e) => Err(e),
    };

    ProbeReport {
        sections: vec![check_config(config), check_response(&outcome)],
    }
}

fn check_config(config: &LookupConfig) -> Section {
    let endpoint = match config.validate() {
        Ok(()) => Check::pass("Endpoint", config.endpoint_url.trim()),
        Err(e) => Check::fail(
            "Endpoint",
            e.to_string(),
            "Set endpoint_url in lookup.toml or pass --endpoint",
        ),
    };

    let timeout = match config.timeout() {
        Some(timeout) => Check::pass("Timeout", format!("{}ms", timeout.as_millis())),
        None => Check::warn(
            "Timeout",
            "not set, a stalled request stays loading until superseded",
            "Set timeout_ms in lookup.toml",
        ),
    };

    Section {
        title: "Configuration",
        checks: vec![
            endpoint,
            Check::pass("Debounce", format!("{}ms", config.delay().as_millis())),
            timeout,
        ],
    }
}

/// Names of the response checks, in the order they run
const RESPONSE_CHECKS: [&str; 5] = ["Reachable", "Status", "Payload", "Records", "Unique ids"];

/// Complete a response section, skipping the checks that did not run
fn response_section(mut checks: Vec<Check>) -> Section {
    let ran = checks.len().min(RESPONSE_CHECKS.len());
    checks.extend(RESPONSE_CHECKS[ran..].iter().copied().map(Check::skipped));
    Section {
        title: "Response",
        checks,
    }
}

/// Grade the outcome of one fetch
///
/// Checks run in order; once one fails the rest are skipped.
fn check_response(outcome: &Result<Vec<Candidate>>) -> Section {
    let candidates = match outcome {
        Ok(candidates) => candidates,
        // Configuration errors are reported in their own section
        Err(e) if !e.is_fetch_failure() => return response_section(Vec::new()),
        Err(LookupError::Status(code)) => {
            return response_section(vec![
                Check::pass("Reachable", format!("answered with HTTP {}", code)),
                Check::fail(
                    "Status",
                    format!("HTTP {}", code),
                    "The endpoint must answer GET with a 2xx status",
                ),
            ]);
        }
        Err(LookupError::Malformed(detail)) => {
            return response_section(vec![
                Check::pass("Reachable", "answered"),
                Check::pass("Status", "2xx"),
                Check::fail(
                    "Payload",
                    detail.as_str(),
                    "Expected [{ \"id\", \"name\", \"email\" }, ...]",
                ),
            ]);
        }
        Err(e) => {
            return response_section(vec![Check::fail(
                "Reachable",
                e.to_string(),
                "Check the URL and your network connection",
            )]);
        }
    };

    let records = if candidates.is_empty() {
        Check::warn(
            "Records",
            "empty list",
            "An empty response keeps whatever the control listed before",
        )
    } else {
        Check::pass("Records", format!("{} candidate(s)", candidates.len()))
    };

    let duplicates = duplicate_ids(candidates);
    let unique = if duplicates.is_empty() {
        Check::pass("Unique ids", "every id appears once")
    } else {
        let ids: Vec<String> = duplicates.iter().map(|id| id.to_string()).collect();
        Check::warn(
            "Unique ids",
            format!("duplicated: {}", ids.join(", ")),
            "Selection matches by id; duplicates are indistinguishable",
        )
    };

    response_section(vec![
        Check::pass("Reachable", "answered"),
        Check::pass("Status", "2xx"),
        Check::pass("Payload", "JSON array of candidates"),
        records,
        unique,
    ])
}

/// Ids that appear more than once, in order of their second appearance
fn duplicate_ids(candidates: &[Candidate]) -> Vec<CandidateId> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    candidates
        .iter()
        .filter(|c| !seen.insert(c.id) && reported.insert(c.id))
        .map(|c| c.id)
        .collect()
}

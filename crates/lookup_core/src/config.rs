//! Lookup configuration
//!
//! The endpoint and timing knobs are passed to the session explicitly
//! instead of living in a global client. The same structure is what
//! `lookup.toml` deserializes into:
//!
//! ```toml
//! endpoint_url = "https://jsonplaceholder.typicode.com/users"
//! timeout_ms = 5000
//! debounce_ms = 500
//! label = "Selection here....."
//! no_options_text = "Add new"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::debounce::DEFAULT_DELAY;
use crate::error::{LookupError, Result};

/// Endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/users";

/// Configuration of one lookup control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupConfig {
    /// URL answering GET with a JSON array of candidates
    #[serde(default = "default_endpoint")]
    pub endpoint_url: String,
    /// Per-request timeout; no timeout when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Quiet period before typed text settles
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Label shown next to the input
    #[serde(default = "default_label")]
    pub label: String,
    /// Text shown when the open panel has nothing to list
    #[serde(default = "default_no_options_text")]
    pub no_options_text: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DELAY.as_millis() as u64
}

fn default_label() -> String {
    "Selection here.....".to_string()
}

fn default_no_options_text() -> String {
    "Add new".to_string()
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint(),
            timeout_ms: None,
            debounce_ms: default_debounce_ms(),
            label: default_label(),
            no_options_text: default_no_options_text(),
        }
    }
}

impl LookupConfig {
    /// Create a configuration for `endpoint_url` with default timing
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Set the debounce delay
    pub fn debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Debounce delay; zero falls back to the default
    pub fn delay(&self) -> Duration {
        match self.debounce_ms {
            0 => DEFAULT_DELAY,
            ms => Duration::from_millis(ms),
        }
    }

    /// Request timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Reject values that cannot work
    pub fn validate(&self) -> Result<()> {
        let url = self.endpoint_url.trim();
        if url.is_empty() {
            return Err(LookupError::Config("endpoint_url is empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(LookupError::Config(format!(
                "endpoint_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        if self.timeout_ms == Some(0) {
            return Err(LookupError::Config(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LookupConfig =
            toml::from_str(content).map_err(|e| LookupError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LookupError::Config(e.to_string()))
    }
}

//! HTTP candidate source
//!
//! Issues a plain `GET` to the configured endpoint: no body, no query
//! string, no auth headers. The typed query is never sent; the endpoint
//! always returns its full list.

use std::future::Future;

use lookup_core::{Candidate, LookupConfig, LookupError, Result};
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Url};

use crate::source::{decode_candidates, CandidateSource};

/// Fetches candidates from a fixed URL
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    /// Create a source for `endpoint_url`
    pub fn new(endpoint_url: &str) -> Result<Self> {
        let url = Url::parse(endpoint_url)
            .map_err(|e| LookupError::Config(format!("{}: {}", endpoint_url, e)))?;

        let client = Client::builder()
            .user_agent(concat!("lookup/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self { client, url })
    }

    /// Create a source from a validated configuration
    pub fn from_config(config: &LookupConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.endpoint_url.trim())
    }

    /// The endpoint this source reads from
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl CandidateSource for HttpSource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<Candidate>>> + Send + 'static {
        let request = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        async move {
            let response = request
                .send()
                .await
                .map_err(|e| LookupError::Network(e.to_string()))?;

            if !response.status().is_success() {
                return Err(LookupError::Status(response.status().as_u16()));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| LookupError::Network(e.to_string()))?;

            decode_candidates(&body)
        }
    }
}

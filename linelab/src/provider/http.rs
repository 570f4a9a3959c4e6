//! HTTP client abstraction for testability.

use super::types::ProviderError;
use std::time::Duration;
use tracing::{debug, trace};

/// Minimal blocking HTTP client contract.
///
/// Keeping the transport behind a trait lets provider tests run against
/// canned bodies instead of the network.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET and returns the response body.
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Real HTTP client backed by reqwest's blocking API.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a client with the given request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::Http(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        trace!(url, "GET");
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ProviderError::Connection(e.to_string())
            } else {
                ProviderError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http(format!(
                "status {} from {}",
                status, url
            )));
        }

        let body = response
            .bytes()
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        debug!(url, bytes = body.len(), "GET complete");
        Ok(body.to_vec())
    }
}

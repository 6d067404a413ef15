//! HTTP transport used by the upstream clients.
//!
//! The registry and package-repository clients only need "GET this URL and
//! give me the body". That is captured by the [`HttpFetch`] trait so the
//! clients can be exercised in tests with canned responses, while the binary
//! uses [`BlockingHttp`], a thin wrapper around a blocking `reqwest` client.

use std::time::Duration;

use log::debug;
use thiserror::Error;

/// Per-request timeout for upstream lookups.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A failed GET, before the caller maps it to a domain error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Trait for HTTP GET requests - allows mocking in tests
pub trait HttpFetch {
    /// Fetches `url` and returns the body of a successful (2xx) response.
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

impl<T: HttpFetch + ?Sized> HttpFetch for &T {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        (**self).get(url)
    }
}

/// Production transport backed by `reqwest::blocking`.
pub struct BlockingHttp {
    client: reqwest::blocking::Client,
}

impl BlockingHttp {
    /// Builds a client with the crate user agent and [`REQUEST_TIMEOUT`].
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("image-updater/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl HttpFetch for BlockingHttp {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .map_err(|e| TransportError::new(format!("Failed to read response body: {}", e)))?;
        Ok(body.to_vec())
    }
}

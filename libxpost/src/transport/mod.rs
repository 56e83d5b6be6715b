//! HTTP transport abstraction
//!
//! The uploader and publisher only ever need "POST these bytes with these
//! headers and give me the status and body back". [`Transport`] captures that,
//! so the signing and orchestration logic can be exercised against
//! [`mock::MockTransport`] and run for real over [`http::HttpTransport`].
//!
//! Implementations must not retry and must not follow redirects. A deadline,
//! DNS failure or dropped connection is reported as
//! [`RequestError::Transport`]; any HTTP status, including non-2xx, is a
//! successful transport call.

use async_trait::async_trait;

use crate::error::RequestError;

pub mod http;

// Available outside tests so integration tests and downstream crates can script responses
pub mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

/// A fully prepared POST request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status code and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a POST request.
    ///
    /// # Errors
    ///
    /// Returns `RequestError::Transport` when no HTTP response was received.
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, RequestError>;
}

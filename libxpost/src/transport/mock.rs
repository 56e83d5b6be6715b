//! Mock transport implementation for testing
//!
//! Records every request it receives and answers from a per-URL script of
//! responses. Useful for verifying the signed request sequence of a publish
//! without network access.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::error::RequestError;
use crate::transport::{HttpRequest, HttpResponse, Transport};

type Reply = Result<HttpResponse, RequestError>;

/// Mock transport for testing
///
/// Clones share the same script and request log, so a test can hand one clone
/// to the code under test and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<HashMap<String, VecDeque<Reply>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request to `url`.
    pub fn respond(&self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> &Self {
        self.push(url, Ok(HttpResponse::new(status, body)))
    }

    /// Queue a JSON response for the next request to `url`.
    pub fn respond_json(&self, url: &str, status: u16, body: serde_json::Value) -> &Self {
        self.respond(url, status, body.to_string())
    }

    /// Queue a transport failure for the next request to `url`.
    pub fn fail(&self, url: &str, message: &str) -> &Self {
        self.push(url, Err(RequestError::Transport(message.to_string())))
    }

    fn push(&self, url: &str, reply: Reply) -> &Self {
        lock(&self.replies)
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// URLs of the requests received so far, in order.
    pub fn urls(&self) -> Vec<String> {
        lock(&self.requests).iter().map(|r| r.url.clone()).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        let url = request.url.clone();
        lock(&self.requests).push(request);

        lock(&self.replies)
            .get_mut(&url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(RequestError::Transport(format!(
                    "No mock response scripted for {url}"
                )))
            })
    }
}

// A test that panicked while holding the lock leaves the data usable.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

//! reqwest-backed transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::debug;

use crate::error::RequestError;
use crate::transport::{HttpRequest, HttpResponse, Transport};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends requests over HTTPS with a fixed deadline.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose requests fail after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, RequestError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .user_agent(format!("xpost/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RequestError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Use an existing client. Its redirect and timeout policy is kept as is.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        debug!(
            url = %request.url,
            body_bytes = request.body.len(),
            "Sending POST request"
        );

        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, "send"))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(e, "read body"))?;

        debug!(status, body_bytes = body.len(), "Received response");

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn map_reqwest_error(error: reqwest::Error, context: &str) -> RequestError {
    let kind = if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };

    RequestError::Transport(format!("{kind} ({context}): {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_bytes, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_forwards_headers_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(header("Authorization", "OAuth test"))
            .and(header("Content-Type", "application/json"))
            .and(body_bytes(b"{\"text\":\"hi\"}".to_vec()))
            .respond_with(ResponseTemplate::new(201).set_body_string("{\"data\":{\"id\":\"1\"}}"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(DEFAULT_TIMEOUT).unwrap();
        let url = format!("{}/2/tweets", server.uri());
        let request = HttpRequest::new(url, b"{\"text\":\"hi\"}".to_vec())
            .with_header("Authorization", "OAuth test")
            .with_header("Content-Type", "application/json");

        let response = transport.post(request).await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body_text(), "{\"data\":{\"id\":\"1\"}}");
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_a_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(DEFAULT_TIMEOUT).unwrap();
        let response = transport
            .post(HttpRequest::new(server.uri(), Vec::new()))
            .await
            .unwrap();

        assert_eq!(response.status, 403);
        assert_eq!(response.body_text(), "Forbidden");
    }

    #[tokio::test]
    async fn test_redirects_are_not_followed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(307).insert_header("Location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(DEFAULT_TIMEOUT).unwrap();
        let response = transport
            .post(HttpRequest::new(format!("{}/old", server.uri()), Vec::new()))
            .await
            .unwrap();

        assert_eq!(response.status, 307);
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_millis(50)).unwrap();
        let error = transport
            .post(HttpRequest::new(server.uri(), Vec::new()))
            .await
            .unwrap_err();

        assert!(error.is_transport());
        assert_eq!(error.status(), None);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind and drop a listener to get a port with nothing behind it
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(DEFAULT_TIMEOUT).unwrap();
        let error = transport
            .post(HttpRequest::new(format!("http://{addr}/2/tweets"), Vec::new()))
            .await
            .unwrap_err();

        assert!(matches!(error, RequestError::Transport(_)));
    }
}

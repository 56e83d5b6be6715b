//! Post publishing orchestration
//!
//! A publish runs at most two signed requests, strictly in sequence: an
//! optional media upload, then post creation. An attachment that cannot be
//! uploaded never blocks the post; the text goes out alone and the failure is
//! reported on the [`PublishOutcome`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::{Config, Endpoints};
use crate::credentials::Credentials;
use crate::error::{RequestError, Result, XpostError};
use crate::oauth::OAuthSigner;
use crate::transport::{HttpRequest, Transport};
use crate::types::{MediaId, PostId, PublishOutcome};
use crate::upload::{MediaUploader, UploadStrategy};

/// JSON body of a create-post request
///
/// Serializes to `{"text":"..."}`, with `"media":{"media_ids":[...]}` only
/// when at least one media identifier is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePostRequest<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaAttachment<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaAttachment<'a> {
    pub media_ids: &'a [MediaId],
}

impl<'a> CreatePostRequest<'a> {
    pub fn new(text: &'a str, media_ids: &'a [MediaId]) -> Self {
        Self {
            text,
            media: (!media_ids.is_empty()).then_some(MediaAttachment { media_ids }),
        }
    }

    /// Encode as the JSON request body.
    pub fn to_body(&self) -> std::result::Result<Vec<u8>, RequestError> {
        serde_json::to_vec(self)
            .map_err(|e| RequestError::Response(format!("failed to encode post body: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct CreatePostResponse {
    data: CreatedPost,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: PostId,
}

/// Reject text that is empty after trimming whitespace.
pub fn validate_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(XpostError::InvalidInput(
            "Post text cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Publishes one post, optionally with a single media attachment.
pub struct PostPublisher {
    transport: Arc<dyn Transport>,
    credentials: Arc<Credentials>,
    endpoints: Endpoints,
    uploader: MediaUploader,
}

impl PostPublisher {
    /// Create a publisher with default upload settings for `strategy`.
    ///
    /// `endpoints.upload` is used as given, whatever the strategy.
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Credentials,
        endpoints: Endpoints,
        strategy: UploadStrategy,
    ) -> Self {
        let credentials = Arc::new(credentials);
        let uploader = MediaUploader::new(
            Arc::clone(&transport),
            Arc::clone(&credentials),
            endpoints.upload.clone(),
            strategy,
        );

        Self {
            transport,
            credentials,
            endpoints,
            uploader,
        }
    }

    /// Create a publisher from loaded configuration
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use libxpost::{Config, Credentials, PostPublisher};
    /// use libxpost::transport::HttpTransport;
    ///
    /// # async fn example() -> libxpost::Result<()> {
    /// let config = Config::load()?;
    /// let credentials = Credentials::from_env()?;
    /// let transport = Arc::new(HttpTransport::new(config.timeout())?);
    ///
    /// let publisher = PostPublisher::from_config(&config, credentials, transport);
    /// let outcome = publisher.publish("hello world", None).await?;
    /// println!("{}", publisher.permalink(&outcome));
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_config(
        config: &Config,
        credentials: Credentials,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let credentials = Arc::new(credentials);
        let endpoints = config.endpoints();
        let uploader = MediaUploader::new(
            Arc::clone(&transport),
            Arc::clone(&credentials),
            endpoints.upload.clone(),
            config.upload.strategy,
        )
        .with_category(config.upload.category)
        .with_max_bytes(config.upload.max_bytes);

        Self {
            transport,
            credentials,
            endpoints,
            uploader,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn uploader(&self) -> &MediaUploader {
        &self.uploader
    }

    /// Public URL of a published post
    pub fn permalink(&self, outcome: &PublishOutcome) -> String {
        outcome.permalink(&self.endpoints.site_root)
    }

    /// Publish `text`, attaching `attachment` when it names an existing file.
    ///
    /// A path that does not exist is ignored. A failed upload is logged and
    /// recorded in [`PublishOutcome::attachment_failure`]; the post still goes
    /// out as text only.
    ///
    /// # Errors
    ///
    /// * `XpostError::InvalidInput` if `text` is empty or whitespace; no
    ///   request is made
    /// * `XpostError::Request` if post creation fails
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn publish(&self, text: &str, attachment: Option<&Path>) -> Result<PublishOutcome> {
        validate_text(text)?;

        let mut media_ids = Vec::new();
        let mut attachment_failure = None;

        if let Some(path) = attachment {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                match self.uploader.upload(path).await {
                    Ok(media_id) => media_ids.push(media_id),
                    Err(e) => {
                        warn!(
                            "Media upload failed for {}, posting text only: {}",
                            path.display(),
                            e
                        );
                        attachment_failure = Some(e);
                    }
                }
            } else {
                debug!("Attachment {} does not exist, posting text only", path.display());
            }
        }

        let post_id = self.create_post(text, &media_ids).await?;
        info!(post_id = %post_id, media = media_ids.len(), "Post created");

        Ok(PublishOutcome {
            post_id,
            media_ids,
            attachment_failure,
        })
    }

    async fn create_post(&self, text: &str, media_ids: &[MediaId]) -> Result<PostId> {
        let body = CreatePostRequest::new(text, media_ids).to_body()?;

        let authorization =
            OAuthSigner::new(&self.credentials).authorize("POST", &self.endpoints.post, &[])?;

        let request = HttpRequest::new(self.endpoints.post.clone(), body)
            .with_header("Authorization", authorization)
            .with_header("Content-Type", "application/json");

        let response = self.transport.post(request).await?;

        if !response.is_success() {
            return Err(RequestError::Api {
                status: response.status,
                body: response.body_text(),
            }
            .into());
        }

        let created: CreatePostResponse = serde_json::from_slice(&response.body).map_err(|e| {
            RequestError::Response(format!(
                "missing data.id ({e}) in post response: {}",
                response.body_text()
            ))
        })?;

        Ok(created.data.id)
    }
}

//! Signed media upload
//!
//! Two wire formats are supported, selected by [`UploadStrategy`]:
//!
//! | Strategy  | Form fields               | Identifier        |
//! |-----------|---------------------------|-------------------|
//! | `Legacy`  | `media`                   | `media_id_string` |
//! | `MediaV2` | `media`, `media_category` | `data.id`         |
//!
//! `Legacy` defaults to `https://upload.twitter.com/1.1/media/upload.json`,
//! `MediaV2` to `https://api.x.com/2/media/upload`.
//!
//! Only the OAuth parameter set is signed; the multipart body never enters the
//! signature base string.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::credentials::Credentials;
use crate::error::RequestError;
use crate::multipart::{MultipartBody, MultipartEncoder};
use crate::oauth::OAuthSigner;
use crate::transport::{HttpRequest, Transport};
use crate::types::{content_type_for_path, MediaCategory, MediaId, UploadResult};

pub const LEGACY_UPLOAD_ENDPOINT: &str = "https://upload.twitter.com/1.1/media/upload.json";
pub const MEDIA_V2_UPLOAD_ENDPOINT: &str = "https://api.x.com/2/media/upload";

/// Filename sent in the `media` part's Content-Disposition
const UPLOAD_FILENAME: &str = "upload";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStrategy {
    /// v1.1 `media/upload.json`
    Legacy,
    /// v2 `media/upload` (one-shot)
    #[default]
    MediaV2,
}

impl UploadStrategy {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Legacy => LEGACY_UPLOAD_ENDPOINT,
            Self::MediaV2 => MEDIA_V2_UPLOAD_ENDPOINT,
        }
    }

    /// Build the multipart body. The binary field always comes first.
    pub fn encode_body(
        &self,
        data: Vec<u8>,
        content_type: &str,
        category: MediaCategory,
    ) -> MultipartBody {
        let encoder = MultipartEncoder::new().binary("media", UPLOAD_FILENAME, content_type, data);

        match self {
            Self::Legacy => encoder.encode(),
            Self::MediaV2 => encoder.text("media_category", category.as_str()).encode(),
        }
    }

    /// Pull the media identifier out of a 2xx response body.
    pub fn parse_media_id(&self, body: &[u8]) -> UploadResult {
        #[derive(Deserialize)]
        struct V2Response {
            data: V2Media,
        }

        #[derive(Deserialize)]
        struct V2Media {
            id: MediaId,
        }

        #[derive(Deserialize)]
        struct LegacyResponse {
            media_id_string: Option<MediaId>,
            media_id: Option<MediaId>,
        }

        let unexpected = |reason: String| {
            RequestError::Response(format!(
                "{reason} in upload response: {}",
                String::from_utf8_lossy(body)
            ))
        };

        match self {
            Self::MediaV2 => serde_json::from_slice::<V2Response>(body)
                .map(|r| r.data.id)
                .map_err(|e| unexpected(format!("missing data.id ({e})"))),
            Self::Legacy => {
                let response = serde_json::from_slice::<LegacyResponse>(body)
                    .map_err(|e| unexpected(format!("invalid JSON ({e})")))?;
                response
                    .media_id_string
                    .or(response.media_id)
                    .ok_or_else(|| unexpected("missing media_id_string".to_string()))
            }
        }
    }
}

impl FromStr for UploadStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" | "v1" | "v1.1" => Ok(Self::Legacy),
            "media-v2" | "media_v2" | "v2" => Ok(Self::MediaV2),
            _ => Err(format!(
                "Invalid upload strategy: '{}'. Valid options: legacy, media-v2",
                s
            )),
        }
    }
}

impl std::fmt::Display for UploadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::MediaV2 => write!(f, "media-v2"),
        }
    }
}

/// Uploads one file per call and returns the API-assigned media identifier.
pub struct MediaUploader {
    transport: Arc<dyn Transport>,
    credentials: Arc<Credentials>,
    endpoint: String,
    strategy: UploadStrategy,
    category: MediaCategory,
    max_bytes: Option<u64>,
}

impl MediaUploader {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<Credentials>,
        endpoint: impl Into<String>,
        strategy: UploadStrategy,
    ) -> Self {
        Self {
            transport,
            credentials,
            endpoint: endpoint.into(),
            strategy,
            category: MediaCategory::default(),
            max_bytes: None,
        }
    }

    pub fn with_category(mut self, category: MediaCategory) -> Self {
        self.category = category;
        self
    }

    /// Refuse files larger than `max_bytes` before any network call.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn strategy(&self) -> UploadStrategy {
        self.strategy
    }

    pub fn category(&self) -> MediaCategory {
        self.category
    }

    pub fn max_bytes(&self) -> Option<u64> {
        self.max_bytes
    }

    /// Read `path` fully, then POST it as a signed multipart upload.
    ///
    /// No retries. Non-2xx answers come back as `RequestError::Api` with the
    /// body verbatim; network failures as `RequestError::Transport`.
    #[instrument(skip(self), fields(strategy = %self.strategy))]
    pub async fn upload(&self, path: &Path) -> UploadResult {
        let data = self.read_media(path).await?;
        let content_type = content_type_for_path(path);

        info!(
            "Uploading {} ({} bytes, {})",
            path.display(),
            data.len(),
            content_type
        );

        let body = self.strategy.encode_body(data, content_type, self.category);
        let authorization =
            OAuthSigner::new(&self.credentials).authorize("POST", &self.endpoint, &[])?;

        let content_type_header = body.content_type();
        let request = HttpRequest::new(self.endpoint.clone(), body.into_bytes())
            .with_header("Authorization", authorization)
            .with_header("Content-Type", content_type_header);

        let response = self.transport.post(request).await?;

        if !response.is_success() {
            return Err(RequestError::Api {
                status: response.status,
                body: response.body_text(),
            });
        }

        let media_id = self.strategy.parse_media_id(&response.body)?;
        info!(media_id = %media_id, "Upload succeeded");

        Ok(media_id)
    }

    async fn read_media(&self, path: &Path) -> Result<Vec<u8>, RequestError> {
        let read_error = |e: std::io::Error| {
            RequestError::File(format!("Failed to read {}: {}", path.display(), e))
        };

        if let Some(max_bytes) = self.max_bytes {
            let size = tokio::fs::metadata(path).await.map_err(read_error)?.len();
            if size > max_bytes {
                return Err(RequestError::File(format!(
                    "{} is {} bytes, above the {} byte upload limit",
                    path.display(),
                    size,
                    max_bytes
                )));
            }
        }

        let data = tokio::fs::read(path).await.map_err(read_error)?;
        debug!(bytes = data.len(), "Read media file");
        Ok(data)
    }
}

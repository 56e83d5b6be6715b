//! Core types for Xpost

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::error::RequestError;

pub const OCTET_STREAM: &str = "application/octet-stream";

// ============================================================================
// Media Types
// ============================================================================

/// Media types recognised from a file extension
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaMimeType {
    Jpeg,
    Png,
    Gif,
    WebP,
    Mp4,
    QuickTime,
}

impl MediaMimeType {
    /// Detect MIME type from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            "mp4" => Some(Self::Mp4),
            "mov" => Some(Self::QuickTime),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Get the MIME type string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Mp4 => "video/mp4",
            Self::QuickTime => "video/quicktime",
        }
    }
}

impl std::fmt::Display for MediaMimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Content type for an upload, `application/octet-stream` when unknown.
pub fn content_type_for_path(path: &Path) -> &'static str {
    MediaMimeType::from_path(path)
        .map(|mime| mime.as_str())
        .unwrap_or(OCTET_STREAM)
}

/// Value of the `media_category` form field.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    #[default]
    TweetImage,
    TweetGif,
    TweetVideo,
}

impl MediaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TweetImage => "tweet_image",
            Self::TweetGif => "tweet_gif",
            Self::TweetVideo => "tweet_video",
        }
    }
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// API identifiers
// ============================================================================

/// Accepts an identifier sent either as a JSON string or a JSON number.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    })
}

/// Opaque media handle assigned by the upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MediaId(#[serde(deserialize_with = "string_or_number")] pub String);

impl MediaId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a created post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PostId(#[serde(deserialize_with = "string_or_number")] pub String);

impl PostId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<site_root>/i/web/status/<id>`
    pub fn permalink(&self, site_root: &str) -> String {
        format!("{}/i/web/status/{}", site_root.trim_end_matches('/'), self.0)
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Results
// ============================================================================

/// Outcome of an upload: a media identifier or a failure record.
pub type UploadResult = std::result::Result<MediaId, RequestError>;

/// A successfully created post.
///
/// `attachment_failure` is set when an attachment was requested but the upload
/// failed and the post went out as text only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub post_id: PostId,
    pub media_ids: Vec<MediaId>,
    pub attachment_failure: Option<RequestError>,
}

impl PublishOutcome {
    pub fn permalink(&self, site_root: &str) -> String {
        self.post_id.permalink(site_root)
    }

    pub fn has_media(&self) -> bool {
        !self.media_ids.is_empty()
    }
}

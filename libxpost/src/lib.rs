//! libxpost - Signed publishing to the X API
//!
//! Creates a post through the v2 API, optionally attaching one media file
//! uploaded first through a multipart request. Every request carries an
//! OAuth 1.0a HMAC-SHA1 `Authorization` header built by [`oauth`].

pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod multipart;
pub mod oauth;
pub mod publisher;
pub mod transport;
pub mod types;
pub mod upload;

// Re-export commonly used types
pub use config::{Config, Endpoints};
pub use credentials::Credentials;
pub use error::{ConfigError, RequestError, Result, XpostError};
pub use publisher::PostPublisher;
pub use types::{MediaCategory, MediaId, PostId, PublishOutcome, UploadResult};
pub use upload::{MediaUploader, UploadStrategy};

//! Error types for Xpost

use thiserror::Error;

pub type Result<T> = std::result::Result<T, XpostError>;

#[derive(Error, Debug)]
pub enum XpostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request failed: {0}")]
    Request(#[from] RequestError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl XpostError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            XpostError::InvalidInput(_) => 3,
            XpostError::Config(_) => 1,
            XpostError::Request(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error(
        "Missing credentials: {}. Set these environment variables before posting",
        .0.join(", ")
    )]
    MissingCredentials(Vec<String>),
}

/// Failure record for a single signed request.
///
/// Network-calling functions return this as a value; the publisher decides
/// whether it is fatal (post creation) or downgraded to a warning (upload).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Connection, DNS or timeout failure. No HTTP status was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The API answered with a non-2xx status.
    #[error("API rejected request (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// The API answered 2xx but the body did not carry the expected identifier.
    #[error("Unexpected response: {0}")]
    Response(String),

    /// The attachment could not be read or is not acceptable for upload.
    #[error("Media file error: {0}")]
    File(String),

    #[error("Signing error: {0}")]
    Signing(String),
}

impl RequestError {
    /// HTTP status of an API rejection, `None` for every other failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, RequestError::Transport(_))
    }
}

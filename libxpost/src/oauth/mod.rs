//! OAuth 1.0a request signing
//!
//! Three pieces, leaf first:
//!
//! - [`encode`]: RFC 3986 percent-encoding shared by the signer and the header
//! - [`signer`]: signature base string, signing key and HMAC-SHA1 signature
//! - [`header`]: the `Authorization: OAuth ...` header value
//!
//! [`OAuthSigner`] ties them together for one request: it builds a fresh
//! parameter set (nonce and timestamp), signs it and renders the header from
//! that same set.
//!
//! # Examples
//!
//! ```no_run
//! use libxpost::credentials::Credentials;
//! use libxpost::oauth::OAuthSigner;
//!
//! # fn example() -> Result<(), libxpost::error::RequestError> {
//! let credentials = Credentials::new("key", "secret", "token", "token-secret");
//! let header = OAuthSigner::new(&credentials)
//!     .authorize("POST", "https://api.x.com/2/tweets", &[])?;
//! assert!(header.starts_with("OAuth "));
//! # Ok(())
//! # }
//! ```

pub mod encode;
pub mod header;
pub mod signer;

pub use encode::percent_encode;
pub use header::build_header;
pub use signer::{sign, OAuthParams, OAuthSigner, Signature};

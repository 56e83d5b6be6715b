//! OAuth 1.0a HMAC-SHA1 signatures

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;

use crate::credentials::Credentials;
use crate::error::RequestError;
use crate::oauth::encode::percent_encode;
use crate::oauth::header::build_header;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";
pub const SIGNATURE_PARAM: &str = "oauth_signature";

type HmacSha1 = Hmac<Sha1>;

/// The `oauth_*` parameters of a single request.
///
/// Built fresh per request. The same instance is signed and then rendered into
/// the `Authorization` header, with `oauth_signature` inserted after signing.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthParams {
    params: BTreeMap<String, String>,
}

impl OAuthParams {
    /// Build a parameter set with a fresh random nonce and the current time.
    pub fn generate(credentials: &Credentials) -> Result<Self, RequestError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| RequestError::Signing(format!("Failed to get timestamp: {e}")))?
            .as_secs();

        Ok(Self::with_nonce_and_timestamp(
            credentials.consumer_key(),
            credentials.access_token(),
            generate_nonce(),
            timestamp,
        ))
    }

    /// Build a parameter set with a fixed nonce and timestamp.
    pub fn with_nonce_and_timestamp(
        consumer_key: &str,
        token: &str,
        nonce: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        let params = BTreeMap::from([
            ("oauth_consumer_key".to_string(), consumer_key.to_string()),
            ("oauth_nonce".to_string(), nonce.into()),
            ("oauth_signature_method".to_string(), SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), token.to_string()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ]);

        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn is_signed(&self) -> bool {
        self.params.contains_key(SIGNATURE_PARAM)
    }

    /// Store the signature in its raw base64 form.
    pub fn insert_signature(&mut self, signature: &Signature) {
        self.params
            .insert(SIGNATURE_PARAM.to_string(), signature.as_base64().to_string());
    }
}

// Values include the consumer key and access token, so only keys are shown.
impl std::fmt::Debug for OAuthParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.params.keys()).finish()
    }
}

/// A computed HMAC-SHA1 signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(String);

impl Signature {
    /// The base64 digest, before percent-encoding.
    pub fn as_base64(&self) -> &str {
        &self.0
    }

    /// The percent-encoded digest as it appears on the wire.
    pub fn encoded(&self) -> String {
        percent_encode(&self.0)
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encoded())
    }
}

/// Build the sorted, percent-encoded `key=value&...` parameter string.
///
/// Pairs are ordered byte-wise by key, then by value. `oauth_signature` is
/// never part of the signed set and is skipped if present.
pub fn parameter_string<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<(&str, &str)> = params
        .into_iter()
        .filter(|(key, _)| *key != SIGNATURE_PARAM)
        .collect();
    pairs.sort_unstable();

    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// `METHOD&encode(url)&encode(parameter_string)`
///
/// `url` must not carry a query string or fragment.
pub fn signature_base_string<'a, I>(method: &str, url: &str, params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&parameter_string(params))
    )
}

/// `encode(consumer_secret)&encode(token_secret)`, keeping the trailing `&`
/// when the token secret is empty.
pub fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    )
}

/// Compute the OAuth 1.0a HMAC-SHA1 signature of a request.
///
/// Deterministic: identical inputs (including nonce and timestamp inside
/// `params`) always produce the same signature.
pub fn sign<'a, I>(
    method: &str,
    url: &str,
    params: I,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<Signature, RequestError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let base_string = signature_base_string(method, url, params);
    let key = signing_key(consumer_secret, token_secret);

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| RequestError::Signing(e.to_string()))?;
    mac.update(base_string.as_bytes());

    Ok(Signature(BASE64.encode(mac.finalize().into_bytes())))
}

/// Signs requests on behalf of one set of credentials.
#[derive(Debug)]
pub struct OAuthSigner<'a> {
    credentials: &'a Credentials,
}

impl<'a> OAuthSigner<'a> {
    pub fn new(credentials: &'a Credentials) -> Self {
        Self { credentials }
    }

    /// Generate the `Authorization` header value for a request.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method (GET, POST, etc.)
    /// * `url` - Endpoint URL without query parameters
    /// * `extra_params` - Additional signable parameters (query or form fields).
    ///   Raw JSON and multipart bodies contribute nothing here.
    pub fn authorize(
        &self,
        method: &str,
        url: &str,
        extra_params: &[(String, String)],
    ) -> Result<String, RequestError> {
        let params = OAuthParams::generate(self.credentials)?;
        self.authorize_with(method, url, params, extra_params)
    }

    /// Same as [`authorize`](Self::authorize) with a caller-supplied parameter set.
    pub fn authorize_with(
        &self,
        method: &str,
        url: &str,
        mut params: OAuthParams,
        extra_params: &[(String, String)],
    ) -> Result<String, RequestError> {
        let signable = params
            .iter()
            .chain(extra_params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let signature = sign(
            method,
            url,
            signable,
            self.credentials.consumer_secret(),
            self.credentials.access_token_secret(),
        )?;

        params.insert_signature(&signature);
        Ok(build_header(params.iter()))
    }
}

/// 128 random bits as 32 lowercase hex characters.
fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

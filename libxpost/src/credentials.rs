//! OAuth 1.0a user-context credentials
//!
//! The four secrets are wrapped in [`SecretString`] so they are zeroed on drop
//! and never appear in `Debug` output or logs.
//!
//! # Example
//!
//! ```no_run
//! use libxpost::credentials::Credentials;
//!
//! # fn example() -> libxpost::Result<()> {
//! // Reads X_API_KEY, X_API_SECRET, X_ACCESS_TOKEN and X_ACCESS_TOKEN_SECRET
//! let credentials = Credentials::from_env()?;
//! # Ok(())
//! # }
//! ```

use secrecy::{ExposeSecret, SecretString};

use crate::error::{ConfigError, Result};

pub const ENV_API_KEY: &str = "X_API_KEY";
pub const ENV_API_SECRET: &str = "X_API_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "X_ACCESS_TOKEN";
pub const ENV_ACCESS_TOKEN_SECRET: &str = "X_ACCESS_TOKEN_SECRET";

/// Environment variable names in the order they are reported when missing.
pub const CREDENTIAL_VARS: [&str; 4] = [
    ENV_API_KEY,
    ENV_API_SECRET,
    ENV_ACCESS_TOKEN,
    ENV_ACCESS_TOKEN_SECRET,
];

pub struct Credentials {
    consumer_key: SecretString,
    consumer_secret: SecretString,
    access_token: SecretString,
    access_token_secret: SecretString,
}

impl Credentials {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: SecretString::from(consumer_key.into()),
            consumer_secret: SecretString::from(consumer_secret.into()),
            access_token: SecretString::from(access_token.into()),
            access_token_secret: SecretString::from(access_token_secret.into()),
        }
    }

    /// Load credentials from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingCredentials` naming every variable that is
    /// unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load credentials through an arbitrary name → value lookup
    ///
    /// Empty and whitespace-only values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let values = CREDENTIAL_VARS.map(|name| lookup(name).filter(|v| !v.trim().is_empty()));

        match values {
            [Some(key), Some(secret), Some(token), Some(token_secret)] => {
                Ok(Self::new(key, secret, token, token_secret))
            }
            values => {
                let missing = CREDENTIAL_VARS
                    .iter()
                    .zip(values.iter())
                    .filter(|(_, value)| value.is_none())
                    .map(|(name, _)| name.to_string())
                    .collect();
                Err(ConfigError::MissingCredentials(missing).into())
            }
        }
    }

    pub fn consumer_key(&self) -> &str {
        self.consumer_key.expose_secret()
    }

    pub fn consumer_secret(&self) -> &str {
        self.consumer_secret.expose_secret()
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    pub fn access_token_secret(&self) -> &str {
        self.access_token_secret.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &"[REDACTED]")
            .field("consumer_secret", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("access_token_secret", &"[REDACTED]")
            .finish()
    }
}

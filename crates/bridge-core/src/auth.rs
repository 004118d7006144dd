use std::fmt;

use http::{HeaderMap, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};

const BEARER_PREFIX: &str = "Bearer ";

/// Caller's vendor API key, forwarded unmodified to every upstream call
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Extract the key from an `Authorization: Bearer <key>` header
    ///
    /// # Errors
    ///
    /// Returns an error if the header is absent, not valid UTF-8, uses a
    /// different scheme, or carries an empty key
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AuthError> {
        let value = headers.get(AUTHORIZATION).ok_or(AuthError::Missing)?;
        let value = value.to_str().map_err(|_| AuthError::Malformed)?;

        let key = value.strip_prefix(BEARER_PREFIX).ok_or(AuthError::Malformed)?;

        if key.trim().is_empty() {
            return Err(AuthError::EmptyKey);
        }

        Ok(Self(SecretString::from(key.to_owned())))
    }

    /// Value for an outbound `Authorization` header
    pub fn bearer(&self) -> String {
        format!("{BEARER_PREFIX}{}", self.0.expose_secret())
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self(SecretString::from(key.to_owned()))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Reasons an inbound request carries no usable credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    Missing,
    #[error("Invalid Authorization header format. Expected: Bearer <api_key>")]
    Malformed,
    #[error("API key is empty")]
    EmptyKey,
}

//! Shared signing secret.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use secrecy::{ExposeSecret, Secret};

use crate::error::{secret_error, Error, SecretErrorKind};

/// Prefix tag carried by encoded webhook secrets.
pub const SECRET_PREFIX: &str = "whsec_";

/// HMAC key shared with the webhook sender.
///
/// The raw bytes stay wrapped in [`Secret`] and are zeroized on drop. `Debug` is redacted,
/// so a `WebhookSecret` can sit inside structs that get logged.
pub struct WebhookSecret {
    key: Secret<Vec<u8>>,
}

impl WebhookSecret {
    /// Wraps raw key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, Error> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(secret_error(SecretErrorKind::Empty, "webhook secret is empty"));
        }
        Ok(Self {
            key: Secret::new(bytes),
        })
    }

    /// Decodes `whsec_<base64>` or bare `<base64>`.
    pub fn parse(encoded: &str) -> Result<Self, Error> {
        let encoded = encoded.trim();
        let encoded = encoded.strip_prefix(SECRET_PREFIX).unwrap_or(encoded);
        if encoded.is_empty() {
            return Err(secret_error(SecretErrorKind::Empty, "webhook secret is empty"));
        }

        let bytes = BASE64_STANDARD.decode(encoded).map_err(|_| {
            secret_error(
                SecretErrorKind::InvalidEncoding,
                "webhook secret is not valid base64",
            )
        })?;
        Self::from_bytes(bytes)
    }

    pub(crate) fn key(&self) -> &[u8] {
        self.key.expose_secret()
    }
}

impl FromStr for WebhookSecret {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WebhookSecret([REDACTED])")
    }
}

//! Webhook signature verification.

mod headers;
mod secret;
mod signature;
mod timestamp;

pub use headers::{HeaderNames, SigningHeaders, STANDARD_HEADERS, SVIX_HEADERS};
pub use secret::{WebhookSecret, SECRET_PREFIX};
pub use signature::{sign, HmacWebhookVerifier, ACCEPTED_SCHEMES};
pub use timestamp::normalize_timestamp;

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::error::Error;

/// Outcome of checking one incoming event.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    /// The signature matched and the payload parsed as JSON.
    Verified(Value),
    Rejected(RejectionReason),
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified(_))
    }
}

/// Why an event was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// One of the id, timestamp or signature headers is absent or blank.
    MissingHeaders,
    /// The timestamp header is neither epoch seconds nor ISO-8601.
    InvalidTimestamp,
    /// The timestamp lies outside the configured tolerance window.
    TimestampExpired,
    /// No supplied signature matches the expected one.
    InvalidSignature,
    /// The signature matched but the body is not JSON.
    MalformedPayload,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RejectionReason::MissingHeaders => "Missing required webhook headers",
            RejectionReason::InvalidTimestamp => "Invalid webhook timestamp",
            RejectionReason::TimestampExpired => "Webhook timestamp outside tolerance window",
            RejectionReason::InvalidSignature => "No matching webhook signature",
            RejectionReason::MalformedPayload => "Webhook payload is not JSON",
        };
        f.write_str(reason)
    }
}

/// Trait for verifying signed webhook requests.
pub trait WebhookVerifier: Send + Sync {
    /// Verify a webhook request.
    ///
    /// # Arguments
    ///
    /// * `body` - Raw request body bytes
    /// * `headers` - HTTP headers from the webhook request, names in any case
    ///
    /// # Returns
    ///
    /// `Verified` with the parsed payload, or `Rejected` with the reason. `Err` is
    /// reserved for failures unrelated to the request itself.
    fn verify(&self, body: &[u8], headers: &HashMap<String, String>)
        -> Result<Verification, Error>;
}

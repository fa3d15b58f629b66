//! HMAC-SHA256 signatures over `{msg_id}.{timestamp}.{payload}`.

use std::collections::HashMap;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use log::Level;
use service::EventLog;
use sha2::Sha256;

use super::{
    normalize_timestamp, RejectionReason, SigningHeaders, Verification, WebhookSecret,
    WebhookVerifier,
};
use crate::error::{crypto_error, Error};

type HmacSha256 = Hmac<Sha256>;

/// Scheme tags whose signatures are checked. Entries with any other tag are skipped.
pub const ACCEPTED_SCHEMES: &[&str] = &["v1"];

/// Signs a payload the way [`HmacWebhookVerifier`] expects.
///
/// Returns the signature header entry `v1,{base64-hmac-sha256}`.
pub fn sign(
    secret: &WebhookSecret,
    msg_id: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<String, Error> {
    let mac = signing_mac(secret, msg_id, timestamp, payload)?;
    Ok(format!(
        "v1,{}",
        BASE64_STANDARD.encode(mac.finalize().into_bytes())
    ))
}

fn signing_mac(
    secret: &WebhookSecret,
    msg_id: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<HmacSha256, Error> {
    let mut mac = HmacSha256::new_from_slice(secret.key())
        .map_err(|_| crypto_error("Invalid HMAC key"))?;
    mac.update(msg_id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Verifies Standard Webhooks style signatures and records every outcome.
pub struct HmacWebhookVerifier {
    secret: WebhookSecret,
    tolerance: Option<Duration>,
    event_log: EventLog,
}

impl HmacWebhookVerifier {
    /// Create a new verifier. No timestamp tolerance is enforced until
    /// [`with_tolerance`](Self::with_tolerance) is called.
    pub fn new(secret: WebhookSecret, event_log: EventLog) -> Self {
        Self {
            secret,
            tolerance: None,
            event_log,
        }
    }

    /// Reject events whose timestamp is further than `tolerance` from the current time.
    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn tolerance(&self) -> Option<Duration> {
        self.tolerance
    }

    /// Signs with this verifier's secret.
    pub fn sign(&self, msg_id: &str, timestamp: i64, payload: &[u8]) -> Result<String, Error> {
        sign(&self.secret, msg_id, timestamp, payload)
    }

    /// [`WebhookVerifier::verify`] against an explicit clock.
    pub fn verify_at(
        &self,
        body: &[u8],
        headers: &HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> Result<Verification, Error> {
        let Some(signing) = SigningHeaders::extract(headers) else {
            let mut present: Vec<&str> = headers.keys().map(String::as_str).collect();
            present.sort_unstable();
            return self.reject(
                RejectionReason::MissingHeaders,
                &format!("headers present: [{}]", present.join(", ")),
            );
        };

        let Some(timestamp) = normalize_timestamp(signing.timestamp) else {
            return self.reject(
                RejectionReason::InvalidTimestamp,
                &format!("id={}, timestamp={:?}", signing.id, signing.timestamp),
            );
        };

        if let Some(tolerance) = self.tolerance {
            let skew = now.timestamp().abs_diff(timestamp);
            if skew > tolerance.as_secs() {
                return self.reject(
                    RejectionReason::TimestampExpired,
                    &format!(
                        "id={}, timestamp={}, skew={}s, tolerance={}s",
                        signing.id,
                        timestamp,
                        skew,
                        tolerance.as_secs()
                    ),
                );
            }
        }

        let expected = signing_mac(&self.secret, signing.id, timestamp, body)?;
        let supplied = signing.signatures().count();
        if !signing
            .signatures()
            .any(|candidate| matches_candidate(&expected, candidate))
        {
            return self.reject(
                RejectionReason::InvalidSignature,
                &format!(
                    "id={}, timestamp={}, signatures supplied={}",
                    signing.id, timestamp, supplied
                ),
            );
        }

        // Only authenticated bytes are interpreted.
        let payload: serde_json::Value = match serde_json::from_slice(body) {
            Ok(payload) => payload,
            Err(e) => {
                return self.reject(
                    RejectionReason::MalformedPayload,
                    &format!("id={}, timestamp={}, error={}", signing.id, timestamp, e),
                );
            }
        };

        self.event_log.record(
            Level::Info,
            &format!(
                "Received valid webhook event: {} (id={}, timestamp={}, {} bytes)",
                event_type(&payload),
                signing.id,
                timestamp,
                body.len()
            ),
        )?;
        Ok(Verification::Verified(payload))
    }

    fn reject(&self, reason: RejectionReason, detail: &str) -> Result<Verification, Error> {
        self.event_log.record(
            Level::Error,
            &format!("Webhook verification failed: {} ({})", reason, detail),
        )?;
        Ok(Verification::Rejected(reason))
    }
}

impl WebhookVerifier for HmacWebhookVerifier {
    fn verify(
        &self,
        body: &[u8],
        headers: &HashMap<String, String>,
    ) -> Result<Verification, Error> {
        self.verify_at(body, headers, Utc::now())
    }
}

/// Checks one `tag,base64` entry. `verify_slice` compares in constant time.
fn matches_candidate(expected: &HmacSha256, candidate: &str) -> bool {
    let Some((tag, value)) = candidate.split_once(',') else {
        return false;
    };
    if !ACCEPTED_SCHEMES.contains(&tag) {
        return false;
    }
    match BASE64_STANDARD.decode(value) {
        Ok(bytes) => expected.clone().verify_slice(&bytes).is_ok(),
        Err(_) => false,
    }
}

/// Best-effort event type for the log line.
fn event_type(payload: &serde_json::Value) -> &str {
    payload
        .get("type")
        .or_else(|| payload.get("event"))
        .and_then(|value| value.as_str())
        .unwrap_or("unknown")
}

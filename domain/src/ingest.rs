//! Push-mode processing of a single webhook request.
//!
//! With a verifier configured every request goes through signature verification before
//! anything is logged as received. An unverified ingestor only exists when the operator
//! opted in to unsigned events; it parses the body and records it at WARN level, never
//! as a received event.

use std::collections::HashMap;
use std::sync::Arc;

use log::*;
use serde_json::Value;
use service::EventLog;
use webhook_auth::webhook::{RejectionReason, Verification, WebhookVerifier};

use crate::error::Error;

/// What happened to one pushed request.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// The event was verified and logged. Carries the parsed payload.
    Accepted(Value),
    /// The event was logged without any authenticity check.
    Unverified(Value),
    /// Signature verification refused the event.
    Rejected(RejectionReason),
    /// The body could not be read or parsed before any verification took place.
    RequestParseError(String),
}

impl IngestOutcome {
    /// Human readable summary returned to the caller.
    pub fn message(&self) -> String {
        match self {
            IngestOutcome::Accepted(_) => "Event received and logged".to_string(),
            IngestOutcome::Unverified(_) => {
                "Event logged without signature verification".to_string()
            }
            IngestOutcome::Rejected(reason) => reason.to_string(),
            IngestOutcome::RequestParseError(detail) => detail.clone(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            IngestOutcome::Accepted(_) | IngestOutcome::Unverified(_)
        )
    }
}

pub struct Ingestor {
    verifier: Option<Arc<dyn WebhookVerifier>>,
    event_log: EventLog,
}

impl Ingestor {
    /// Ingests only events that pass `verifier`.
    pub fn verified(verifier: Arc<dyn WebhookVerifier>, event_log: EventLog) -> Self {
        Self {
            verifier: Some(verifier),
            event_log,
        }
    }

    /// Ingests any JSON body without an authenticity check. Only for operators that
    /// explicitly allow unsigned events.
    pub fn unverified(event_log: EventLog) -> Self {
        Self {
            verifier: None,
            event_log,
        }
    }

    pub fn is_verifying(&self) -> bool {
        self.verifier.is_some()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn ingest(
        &self,
        headers: &HashMap<String, String>,
        body: &[u8],
    ) -> Result<IngestOutcome, Error> {
        match &self.verifier {
            Some(verifier) => match verifier.verify(body, headers)? {
                Verification::Verified(payload) => Ok(IngestOutcome::Accepted(payload)),
                Verification::Rejected(reason) => {
                    debug!("Webhook rejected: {reason}");
                    Ok(IngestOutcome::Rejected(reason))
                }
            },
            None => self.ingest_unverified(body),
        }
    }

    /// Records a body that could not even be read off the wire.
    pub fn request_parse_error(&self, detail: &str) -> Result<IngestOutcome, Error> {
        self.event_log
            .record(Level::Error, &format!("Error processing webhook: {detail}"))?;
        Ok(IngestOutcome::RequestParseError(detail.to_string()))
    }

    fn ingest_unverified(&self, body: &[u8]) -> Result<IngestOutcome, Error> {
        match serde_json::from_slice::<Value>(body) {
            Ok(payload) => {
                self.event_log.record(
                    Level::Warn,
                    &format!("Unsigned webhook event logged without verification: {payload}"),
                )?;
                Ok(IngestOutcome::Unverified(payload))
            }
            Err(e) => self.request_parse_error(&e.to_string()),
        }
    }
}

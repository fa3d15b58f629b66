//! # webhook-auth
//!
//! Authenticity checks for incoming webhook events and the HTTP plumbing used to
//! fetch them:
//! - Shared secret handling (`whsec_` encoded keys, redacted in logs)
//! - HMAC-SHA256 signature verification over `{msg_id}.{timestamp}.{payload}`
//! - Timestamp normalization and an optional tolerance window
//! - HTTP client building with retry middleware for poll mode
//!
//! ## Usage
//!
//! ```rust,ignore
//! use webhook_auth::webhook::{HmacWebhookVerifier, Verification, WebhookSecret, WebhookVerifier};
//!
//! let secret = WebhookSecret::parse("whsec_dGVzdF9zZWNyZXQ=")?;
//! let verifier = HmacWebhookVerifier::new(secret, event_log);
//! match verifier.verify(&body, &headers)? {
//!     Verification::Verified(payload) => { /* trusted */ }
//!     Verification::Rejected(reason) => { /* refused */ }
//! }
//! ```

pub mod error;
pub mod http;
pub mod webhook;

// Re-export commonly used types
pub use error::{Error, ErrorKind};

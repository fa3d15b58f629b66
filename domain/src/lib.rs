//! Domain behavior of the watchdog: what happens to a pushed webhook request and how
//! poll mode checks a remote endpoint. Consumers of this crate do not need to depend
//! on `webhook-auth` for the outcome types; they are re-exported here.
pub use webhook_auth::http::HttpClientConfig;
pub use webhook_auth::webhook::{RejectionReason, Verification};

pub mod error;
pub mod ingest;
pub mod poller;

pub use ingest::{IngestOutcome, Ingestor};
pub use poller::{PollError, Poller};

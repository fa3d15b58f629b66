//! Poll mode: fetch a remote URL on a fixed interval and log whatever JSON it returns.
//!
//! Polled data is never signature checked. The poller warns about this once when it starts.

use std::fmt;
use std::time::Duration;

use log::*;
use serde_json::Value;
use service::EventLog;
use webhook_auth::http::{HttpClientConfig, PollingClient, PollingClientBuilder};

use crate::error::Error;

/// Why a single check produced no data.
#[derive(Debug, Clone, PartialEq)]
pub enum PollError {
    /// Connection failure, timeout or a non-success status.
    Network(String),
    /// The response body was not JSON.
    ResponseParse(String),
}

impl fmt::Display for PollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollError::Network(detail) => write!(f, "network error: {detail}"),
            PollError::ResponseParse(detail) => write!(f, "invalid JSON response: {detail}"),
        }
    }
}

impl std::error::Error for PollError {}

pub struct Poller {
    client: PollingClient,
    url: String,
    interval: Duration,
    event_log: EventLog,
}

impl Poller {
    pub fn new(
        url: impl Into<String>,
        interval: Duration,
        http_config: HttpClientConfig,
        event_log: EventLog,
    ) -> Result<Self, Error> {
        let client = PollingClientBuilder::from_config(http_config).build()?;
        Ok(Self {
            client,
            url: url.into(),
            interval,
            event_log,
        })
    }

    /// Performs one GET request and decodes the body as JSON.
    pub async fn fetch(&self) -> Result<Value, PollError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PollError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Network(format!("unexpected status {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PollError::Network(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| PollError::ResponseParse(e.to_string()))
    }

    /// Runs one check. Failures are logged and reported as `None`, never raised.
    pub async fn check_webhook(&self) -> Option<Value> {
        match self.fetch().await {
            Ok(data) => {
                self.record(Level::Info, &format!("Received webhook data: {data}"));
                Some(data)
            }
            Err(e) => {
                self.record(Level::Error, &format!("Error checking webhook: {e}"));
                None
            }
        }
    }

    /// Checks immediately, then once per interval, until the task is cancelled.
    pub async fn run(&self) {
        self.record(
            Level::Warn,
            &format!(
                "Polling {} every {}s; polled data is not signature verified",
                self.url,
                self.interval.as_secs()
            ),
        );

        loop {
            self.check_webhook().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    fn record(&self, level: Level, message: &str) {
        if let Err(e) = self.event_log.record(level, message) {
            warn!(
                "Failed to write to event log {}: {e}",
                self.event_log.path().display()
            );
        }
    }
}

//! HTTP client building with middleware.

mod client;
mod retry;

pub use client::{HttpClientConfig, PollingClient, PollingClientBuilder};
pub use retry::BackoffPolicy;

use anyhow::Result;
use chrono::Utc;
use colored::*;
use serde_json::json;
use std::time::Instant;
use webhook_auth::webhook::WebhookSecret;

use crate::api_client::{WebhookClient, WebhookRequest};
use crate::output::{print_response, TestResult};

/// Outcome the endpoint should report for a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Success,
    Error,
}

impl Expected {
    fn status(self) -> &'static str {
        match self {
            Expected::Success => "success",
            Expected::Error => "error",
        }
    }
}

fn test_payload(event_type: &str) -> String {
    json!({
        "type": event_type,
        "data": {"foo": "bar", "sent_by": "send-test-webhook"}
    })
    .to_string()
}

/// Posts `request` and compares the reported status with `expected`.
pub async fn run_scenario(
    scenario: &str,
    client: &WebhookClient,
    request: WebhookRequest,
    expected: Expected,
) -> Result<TestResult> {
    let start = Instant::now();

    println!(
        "\n{}",
        format!("=== TEST: {scenario} ===").bright_cyan().bold()
    );
    println!("{} Posting webhook event...", "→".blue());

    let response = match client.send(&request).await {
        Ok(response) => response,
        Err(e) => {
            println!("{} Request failed: {}", "✗".red(), e);
            return Ok(TestResult {
                scenario: scenario.to_string(),
                passed: false,
                message: Some(format!("Request failed: {e:#}")),
                duration: start.elapsed(),
            });
        }
    };
    print_response(scenario, &response);

    let status = response["status"].as_str().unwrap_or_default();
    if status == expected.status() {
        println!("{} Endpoint reported {}", "✓".green(), status);
        Ok(TestResult {
            scenario: scenario.to_string(),
            passed: true,
            message: None,
            duration: start.elapsed(),
        })
    } else {
        println!("{} Unexpected status!", "✗".red());
        Ok(TestResult {
            scenario: scenario.to_string(),
            passed: false,
            message: Some(format!(
                "Expected status={}, got status={} ({})",
                expected.status(),
                status,
                response["message"]
            )),
            duration: start.elapsed(),
        })
    }
}

pub async fn test_valid_event(
    client: &WebhookClient,
    secret: &WebhookSecret,
) -> Result<TestResult> {
    let request = WebhookRequest::signed(secret, &test_payload("test.valid"), Utc::now())?;
    run_scenario("valid_event", client, request, Expected::Success).await
}

pub async fn test_iso_timestamp(
    client: &WebhookClient,
    secret: &WebhookSecret,
) -> Result<TestResult> {
    let request = WebhookRequest::signed_iso(secret, &test_payload("test.iso"), Utc::now())?;
    run_scenario("iso_timestamp", client, request, Expected::Success).await
}

pub async fn test_tampered_signature(
    client: &WebhookClient,
    secret: &WebhookSecret,
) -> Result<TestResult> {
    let request = WebhookRequest::signed(secret, &test_payload("test.tampered"), Utc::now())?
        .with_header("webhook-signature", "v1,dGFtcGVyZWRfc2lnbmF0dXJl");
    run_scenario("tampered_signature", client, request, Expected::Error).await
}

pub async fn test_tampered_payload(
    client: &WebhookClient,
    secret: &WebhookSecret,
) -> Result<TestResult> {
    let mut request = WebhookRequest::signed(secret, &test_payload("test.tampered"), Utc::now())?;
    request.body = test_payload("test.forged");
    run_scenario("tampered_payload", client, request, Expected::Error).await
}

pub async fn test_missing_headers(
    client: &WebhookClient,
    secret: &WebhookSecret,
) -> Result<TestResult> {
    let request = WebhookRequest::signed(secret, &test_payload("test.missing"), Utc::now())?
        .without_header("webhook-timestamp");
    run_scenario("missing_headers", client, request, Expected::Error).await
}

pub async fn test_malformed_payload(
    client: &WebhookClient,
    secret: &WebhookSecret,
) -> Result<TestResult> {
    let request = WebhookRequest::signed(secret, "this is not json", Utc::now())?;
    run_scenario("malformed_payload", client, request, Expected::Error).await
}

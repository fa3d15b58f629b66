use anyhow::{Context, Result};
use clap::Parser;
use colored::*;

use testing_tools::api_client::WebhookClient;
use testing_tools::output::print_test_summary;
use testing_tools::scenarios;
use webhook_auth::webhook::WebhookSecret;

#[derive(Parser)]
#[command(name = "send-test-webhook")]
#[command(about = "Webhook Watchdog Integration Testing Tool")]
struct Cli {
    /// Webhook endpoint of a running watchdog (e.g., http://localhost:8000/webhook)
    #[arg(long, default_value = "http://localhost:8000/webhook")]
    url: String,

    /// Signing secret the watchdog was started with (whsec_<base64> or bare base64)
    #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
    secret: String,

    /// Test scenario to run
    #[arg(long, value_enum, default_value = "all")]
    scenario: ScenarioChoice,
}

#[derive(clap::ValueEnum, Clone)]
enum ScenarioChoice {
    /// Correctly signed event with an epoch timestamp
    ValidEvent,
    /// Correctly signed event with an ISO-8601 timestamp
    IsoTimestamp,
    /// Event whose signature header was replaced
    TamperedSignature,
    /// Event whose body was changed after signing
    TamperedPayload,
    /// Signed event without a timestamp header
    MissingHeaders,
    /// Correctly signed body that is not JSON
    MalformedPayload,
    /// Run every scenario
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    println!("{}", "=== SETUP PHASE ===".bright_white().bold());

    let secret = WebhookSecret::parse(&cli.secret).context("Invalid webhook secret")?;
    let client = WebhookClient::new(reqwest::Client::new(), cli.url.clone());
    println!("{} Sending events to {}", "→".blue(), cli.url);

    println!("\n{}", "=== TEST PHASE ===".bright_white().bold());

    let mut results = Vec::new();

    match cli.scenario {
        ScenarioChoice::ValidEvent => {
            results.push(scenarios::test_valid_event(&client, &secret).await?);
        }
        ScenarioChoice::IsoTimestamp => {
            results.push(scenarios::test_iso_timestamp(&client, &secret).await?);
        }
        ScenarioChoice::TamperedSignature => {
            results.push(scenarios::test_tampered_signature(&client, &secret).await?);
        }
        ScenarioChoice::TamperedPayload => {
            results.push(scenarios::test_tampered_payload(&client, &secret).await?);
        }
        ScenarioChoice::MissingHeaders => {
            results.push(scenarios::test_missing_headers(&client, &secret).await?);
        }
        ScenarioChoice::MalformedPayload => {
            results.push(scenarios::test_malformed_payload(&client, &secret).await?);
        }
        ScenarioChoice::All => {
            results.push(scenarios::test_valid_event(&client, &secret).await?);
            results.push(scenarios::test_iso_timestamp(&client, &secret).await?);
            results.push(scenarios::test_tampered_signature(&client, &secret).await?);
            results.push(scenarios::test_tampered_payload(&client, &secret).await?);
            results.push(scenarios::test_missing_headers(&client, &secret).await?);
            results.push(scenarios::test_malformed_payload(&client, &secret).await?);
        }
    }

    print_test_summary(&results);

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

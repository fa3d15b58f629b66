use std::process;
use std::sync::Arc;

use domain::{HttpClientConfig, Ingestor, Poller};
use log::*;
use service::config::{Config, Mode, PollArgs, ServeArgs};
use service::logging::Logger;
use service::EventLog;
use webhook_auth::webhook::{HmacWebhookVerifier, WebhookSecret};

#[tokio::main]
async fn main() {
    let config = Config::new();
    let event_log = EventLog::new(config.log_file());

    if let Err(e) = Logger::init_logger(&config, &event_log) {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(1);
    }

    info!("Starting up Webhook Watchdog {}", env!("CARGO_PKG_VERSION"));
    debug!("Logging events to {}", event_log.path().display());

    match config.mode {
        Mode::Serve(args) => serve(args, event_log).await,
        Mode::Poll(args) => poll(args, event_log).await,
    }
}

async fn serve(args: ServeArgs, event_log: EventLog) {
    debug!("Serve configuration: {args:?}");

    let ingestor = match (args.webhook_secret(), args.allow_unsigned()) {
        (Some(encoded), _) => {
            let secret = match WebhookSecret::parse(encoded) {
                Ok(secret) => secret,
                Err(e) => exit_with_error(&event_log, &format!("Invalid webhook secret: {e}")),
            };
            let mut verifier = HmacWebhookVerifier::new(secret, event_log.clone());
            if let Some(tolerance) = args.timestamp_tolerance() {
                verifier = verifier.with_tolerance(tolerance);
            }
            Ingestor::verified(Arc::new(verifier), event_log.clone())
        }
        (None, true) => {
            warn!("No webhook secret configured; accepting unsigned events (--allow-unsigned)");
            Ingestor::unverified(event_log.clone())
        }
        (None, false) => exit_with_error(
            &event_log,
            "No webhook secret configured; pass --webhook-secret or opt in with --allow-unsigned",
        ),
    };

    let bind_address = args.bind_address();
    if let Err(e) = web::init_server(web::AppState::new(ingestor), &bind_address).await {
        exit_with_error(
            &event_log,
            &format!("Failed to serve on {bind_address}: {e}"),
        );
    }
}

async fn poll(args: PollArgs, event_log: EventLog) {
    let http_config = HttpClientConfig {
        timeout: args.timeout(),
        max_retries: args.max_retries,
        ..HttpClientConfig::default()
    };

    let poller = match Poller::new(&args.url, args.interval(), http_config, event_log.clone()) {
        Ok(poller) => poller,
        Err(e) => exit_with_error(&event_log, &format!("Failed to build HTTP client: {e}")),
    };

    poller.run().await;
}

fn exit_with_error(event_log: &EventLog, message: &str) -> ! {
    if event_log.record(Level::Error, message).is_err() {
        eprintln!("{message}");
    }
    process::exit(1);
}

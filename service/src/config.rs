use clap::builder::TypedValueParser as _;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::event_log;

/// Default interface the push-mode server binds to.
pub const DEFAULT_INTERFACE: &str = "0.0.0.0";

/// Default TCP port the push-mode server listens on.
pub const DEFAULT_PORT: u16 = 8000;

/// Default number of seconds between two polls of the monitored URL.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Default bound on a single poll request.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Set the log level verbosity threshold (level) to control what gets written to the log file
    #[arg(
        short,
        long,
        env,
        global = true,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Path of the event log file. Defaults to a file in the per-user log directory.
    #[arg(long, env, global = true)]
    log_file: Option<PathBuf>,

    /// How webhook events reach the watchdog.
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Mode {
    /// Receive pushed webhook events on POST /webhook
    Serve(ServeArgs),
    /// Periodically fetch webhook events from a URL (no signature verification)
    Poll(PollArgs),
}

#[derive(Clone, Args)]
pub struct ServeArgs {
    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = DEFAULT_INTERFACE)]
    pub interface: String,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Shared signing secret (`whsec_<base64>` or bare base64). Required unless
    /// `--allow-unsigned` is given.
    #[arg(
        long,
        env,
        hide_env_values = true,
        required_unless_present = "allow_unsigned"
    )]
    webhook_secret: Option<String>,

    /// Accept pushed events without a signature check when no secret is configured
    #[arg(long, env)]
    allow_unsigned: bool,

    /// Reject signed events whose timestamp is further than this many seconds from now.
    #[arg(long, env)]
    timestamp_tolerance_secs: Option<u64>,
}

#[derive(Clone, Debug, Args)]
pub struct PollArgs {
    /// URL to monitor
    #[arg(env = "WEBHOOK_URL")]
    pub url: String,

    /// Seconds to wait between two checks
    #[arg(
        short,
        long,
        env = "POLL_INTERVAL",
        default_value_t = DEFAULT_POLL_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Seconds before a single poll request is abandoned
    #[arg(
        long,
        env = "POLL_TIMEOUT_SECS",
        default_value_t = DEFAULT_POLL_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Retries for transient failures within a single check
    #[arg(long, env = "POLL_MAX_RETRIES", default_value_t = 0)]
    pub max_retries: u32,
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Returns the configured log file, falling back to the per-user default location.
    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(event_log::default_log_path)
    }
}

impl ServeArgs {
    /// Address string suitable for binding a listener, e.g. `0.0.0.0:8000`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.interface, self.port)
    }

    /// Returns the encoded signing secret, if one was configured.
    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
    }

    /// Whether unsigned events may be accepted in the absence of a secret.
    pub fn allow_unsigned(&self) -> bool {
        self.allow_unsigned
    }

    pub fn timestamp_tolerance(&self) -> Option<Duration> {
        self.timestamp_tolerance_secs.map(Duration::from_secs)
    }
}

// The secret must never reach a log line, so Debug only reports whether one is set.
impl fmt::Debug for ServeArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServeArgs")
            .field("interface", &self.interface)
            .field("port", &self.port)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("allow_unsigned", &self.allow_unsigned)
            .field("timestamp_tolerance_secs", &self.timestamp_tolerance_secs)
            .finish()
    }
}

impl PollArgs {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

//! Record Store - Command-Line Binary
//!
//! # Usage
//!
//! ```bash
//! recordctl --database records.db init
//! recordctl payments get A1
//! RECORDS_LOG_LEVEL=debug recordctl payments count --where currency=USD
//! ```
//!
//! # Environment Variables
//!
//! * `RECORDS_DATABASE_PATH` - SQLite database file (default: records.db)
//! * `RECORDS_POOL__MAX_CONNECTIONS` - Pool capacity (default: 4)
//! * `RECORDS_POOL__MIN_CONNECTIONS` - Connections opened at start (default: 1)
//! * `RECORDS_POOL__ACQUIRE_TIMEOUT_MS` - Acquire timeout (default: 30000)
//! * `RECORDS_BUSY_TIMEOUT_MS` - SQLite busy timeout (default: 5000)
//! * `RECORDS_LOG_LEVEL` - trace, debug, info, warn, error (default: warn)
//! * `RECORDS_JSON_LOGS` - Emit JSON log lines (default: false)
//! * `RECORDS_STRICT_DECODE` - Fail on mistyped rows (default: false)
//!
//! Pool keys that are not set keep the defaults above, so
//! `RECORDS_POOL__MAX_CONNECTIONS=1` alone gives a one-connection pool.
//!
//! Logs go to stderr; command output is JSON on stdout.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use core_kernel::TracingSink;
use interface_cli::{resolve_config, App, Cli, CliConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = CliConfig::from_env().context("invalid RECORDS_* configuration")?;
    let config = resolve_config(&cli, config);

    init_tracing(&config.log_level, config.json_logs);
    tracing::debug!(?config, "Loaded configuration");

    let app = App::open(&config, Arc::new(TracingSink))
        .with_context(|| format!("cannot open {}", config.database_path.display()))?;
    let outcome = app.run(&cli.command)?;

    println!("{}", serde_json::to_string_pretty(&outcome.body)?);
    Ok(outcome.success)
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

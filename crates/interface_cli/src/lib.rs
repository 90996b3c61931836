//! Record Store Command-Line Interface
//!
//! `recordctl` opens the SQLite record database through the connection pool
//! and runs one command against it, printing the result as JSON.
//!
//! # Example
//!
//! ```bash
//! recordctl --database records.db init
//! recordctl payments create --id A1 --amount 100.00 --currency USD
//! recordctl payments find --where currency=USD
//! recordctl parties count --where kind=1
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;

pub use app::{App, Outcome};
pub use cli::{Cli, Command};
pub use config::CliConfig;
pub use error::CliError;

/// Applies command-line overrides on top of the loaded configuration
pub fn resolve_config(cli: &Cli, mut config: CliConfig) -> CliConfig {
    if let Some(path) = &cli.database {
        config.database_path = path.clone();
    }
    if cli.strict {
        config.strict_decode = true;
    }
    config
}

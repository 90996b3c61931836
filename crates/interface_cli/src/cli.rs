//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use domain_billing::PaymentMethod;
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(
    name = "recordctl",
    about = "Inspect and maintain the record store",
    version
)]
pub struct Cli {
    /// SQLite database file (overrides RECORDS_DATABASE_PATH)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Fail on rows whose values do not match the entity types
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create any missing entity tables
    Init,
    /// Check out a connection and ping the database
    Health,
    /// Show the connection pool partition
    Status,
    /// Payment records
    Payments {
        #[command(subcommand)]
        action: PaymentAction,
    },
    /// Party records
    Parties {
        #[command(subcommand)]
        action: RecordAction,
    },
}

/// Operations every entity supports
#[derive(Debug, Subcommand)]
pub enum RecordAction {
    /// Print the record with the given id
    Get { id: String },
    /// Print records matching every --where predicate
    Find {
        /// column=value; repeat to combine with AND
        #[arg(long = "where", value_name = "COLUMN=VALUE")]
        predicates: Vec<String>,
    },
    /// Count records matching every --where predicate
    Count {
        #[arg(long = "where", value_name = "COLUMN=VALUE")]
        predicates: Vec<String>,
    },
    /// Delete the record with the given id
    Remove { id: String },
}

#[derive(Debug, Subcommand)]
pub enum PaymentAction {
    #[command(flatten)]
    Record(RecordAction),
    /// Record a new payment
    Create {
        /// Generated when omitted
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        currency: String,
        #[arg(long, value_enum, default_value_t = MethodArg::BankTransfer)]
        method: MethodArg,
        #[arg(long)]
        reference: Option<String>,
    },
    /// Change the amount of an existing payment
    SetAmount { id: String, amount: Decimal },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    BankTransfer,
    CreditCard,
    DirectDebit,
    Check,
    Cash,
}

impl From<MethodArg> for PaymentMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::BankTransfer => PaymentMethod::BankTransfer,
            MethodArg::CreditCard => PaymentMethod::CreditCard,
            MethodArg::DirectDebit => PaymentMethod::DirectDebit,
            MethodArg::Check => PaymentMethod::Check,
            MethodArg::Cash => PaymentMethod::Cash,
        }
    }
}

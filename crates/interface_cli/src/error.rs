//! CLI errors

use infra_db::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid filter '{arg}': {reason}")]
    InvalidFilter { arg: String, reason: &'static str },

    #[error("No record with id '{id}' in {table}")]
    NotFound { table: String, id: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Output serialization failed: {0}")]
    Output(#[from] serde_json::Error),
}

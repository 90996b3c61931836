//! Command execution
//!
//! Every command produces a JSON document. Entity output uses the entities'
//! own serde representation.

use std::sync::Arc;

use core_kernel::{new_record_id, DecodePolicy, DiagnosticsSink, RecordCodec};
use domain_billing::Payment;
use infra_db::adapters::{self, PartyStore, PaymentStore};
use infra_db::{ConnectionPool, DatabaseError, GenericRecordStore, SqliteConnectionFactory};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::cli::{Command, PaymentAction, RecordAction};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::filter::parse_filter;

/// Result of a command
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub body: serde_json::Value,
    /// False when the command ran but found a problem (an unhealthy pool)
    pub success: bool,
}

impl Outcome {
    fn ok(body: serde_json::Value) -> Self {
        Self { body, success: true }
    }
}

/// Open database plus the stores built on it
pub struct App {
    pool: Arc<ConnectionPool>,
    sink: Arc<dyn DiagnosticsSink>,
    policy: DecodePolicy,
}

impl App {
    /// Opens the configured database
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::ConnectionUnavailable` if the pool cannot
    /// open its eager connections.
    pub fn open(config: &CliConfig, sink: Arc<dyn DiagnosticsSink>) -> Result<Self, DatabaseError> {
        let factory = SqliteConnectionFactory::file(config.database_path.clone())
            .busy_timeout(config.busy_timeout());
        let pool = ConnectionPool::new(config.pool.clone(), factory, Arc::clone(&sink))?;
        info!(path = %config.database_path.display(), "Opened record database");

        Ok(Self {
            pool: Arc::new(pool),
            sink,
            policy: config.decode_policy(),
        })
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn payments(&self) -> PaymentStore {
        adapters::payment_store(Arc::clone(&self.pool), Arc::clone(&self.sink))
            .with_decode_policy(self.policy)
    }

    pub fn parties(&self) -> PartyStore {
        adapters::party_store(Arc::clone(&self.pool), Arc::clone(&self.sink))
            .with_decode_policy(self.policy)
    }

    pub fn run(&self, command: &Command) -> Result<Outcome, CliError> {
        match command {
            Command::Init => {
                adapters::bootstrap_schema(&self.pool)?;
                let tables: Vec<&str> = adapters::SCHEMAS.iter().map(|(table, _)| *table).collect();
                Ok(Outcome::ok(json!({ "tables": tables })))
            }
            Command::Health => {
                let health = self.pool.health_check();
                Ok(Outcome {
                    success: health.healthy,
                    body: serde_json::to_value(&health)?,
                })
            }
            Command::Status => Ok(Outcome::ok(serde_json::to_value(self.pool.status())?)),
            Command::Payments { action } => self.run_payment_action(action).map(Outcome::ok),
            Command::Parties { action } => run_record_action(&self.parties(), action).map(Outcome::ok),
        }
    }

    fn run_payment_action(&self, action: &PaymentAction) -> Result<serde_json::Value, CliError> {
        let store = self.payments();
        match action {
            PaymentAction::Record(action) => run_record_action(&store, action),
            PaymentAction::Create {
                id,
                amount,
                currency,
                method,
                reference,
            } => {
                let mut payment = Payment::new(
                    id.clone().unwrap_or_else(new_record_id),
                    *amount,
                    currency.as_str(),
                )
                .with_method((*method).into());
                payment.reference = reference.clone();

                store.create(&payment)?;
                info!(id = payment.id(), "Created payment");
                Ok(serde_json::to_value(&payment)?)
            }
            PaymentAction::SetAmount { id, amount } => {
                let mut payment = fetch(&store, id)?;
                payment.set_amount(*amount);
                store.update(&payment)?;
                Ok(serde_json::to_value(&payment)?)
            }
        }
    }
}

fn fetch<C: RecordCodec>(store: &GenericRecordStore<C>, id: &str) -> Result<C::Entity, CliError> {
    store.get_by_id(id)?.ok_or_else(|| CliError::NotFound {
        table: store.table().to_string(),
        id: id.to_string(),
    })
}

fn run_record_action<C>(
    store: &GenericRecordStore<C>,
    action: &RecordAction,
) -> Result<serde_json::Value, CliError>
where
    C: RecordCodec,
    C::Entity: Serialize,
{
    match action {
        RecordAction::Get { id } => Ok(serde_json::to_value(fetch(store, id)?)?),
        RecordAction::Find { predicates } => {
            let filter = parse_filter(predicates)?;
            Ok(serde_json::to_value(store.filtered_find(&filter)?)?)
        }
        RecordAction::Count { predicates } => {
            let filter = parse_filter(predicates)?;
            Ok(json!({ "count": store.count(&filter)? }))
        }
        RecordAction::Remove { id } => {
            store.remove(id.as_str())?;
            Ok(json!({ "removed": id }))
        }
    }
}

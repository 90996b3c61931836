//! End-to-end command tests against a temporary SQLite database

use std::sync::Arc;

use clap::Parser;
use core_kernel::{ErrorCategory, MemorySink};
use interface_cli::{resolve_config, App, Cli, CliConfig, CliError};
use serde_json::json;
use tempfile::TempDir;
use test_utils::assert_reported_times;

struct Harness {
    _dir: TempDir,
    app: App,
    sink: Arc<MemorySink>,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            database_path: dir.path().join("cli.db"),
            ..CliConfig::default()
        };
        let sink = Arc::new(MemorySink::new());
        let app = App::open(&config, sink.clone()).unwrap();
        let harness = Self { _dir: dir, app, sink };
        harness.run(&["init"]).unwrap();
        harness
    }

    fn run(&self, args: &[&str]) -> Result<serde_json::Value, CliError> {
        let cli = Cli::try_parse_from(std::iter::once("recordctl").chain(args.iter().copied()))
            .unwrap();
        self.app.run(&cli.command).map(|outcome| outcome.body)
    }
}

mod parse_tests {
    use super::*;

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from(["recordctl", "status", "--database", "/tmp/x.db", "--strict"]).unwrap();
        let config = resolve_config(&cli, CliConfig::default());

        assert_eq!(config.database_path, std::path::PathBuf::from("/tmp/x.db"));
        assert!(config.strict_decode);
    }

    #[test]
    fn test_bad_amount_rejected_by_parser() {
        let result = Cli::try_parse_from([
            "recordctl", "payments", "create", "--amount", "lots", "--currency", "USD",
        ]);
        assert!(result.is_err());
    }
}

mod command_tests {
    use super::*;

    #[test]
    fn test_init_lists_tables() {
        let h = Harness::new();
        assert_eq!(h.run(&["init"]).unwrap(), json!({ "tables": ["payments", "parties"] }));
    }

    #[test]
    fn test_payment_lifecycle() {
        let h = Harness::new();

        let created = h
            .run(&["payments", "create", "--id", "A1", "--amount", "100.00", "--currency", "USD"])
            .unwrap();
        assert_eq!(created["id"], "A1");
        assert_eq!(created["amount"], "100.00");
        assert_eq!(created["method"], "bank_transfer");

        let found = h.run(&["payments", "find", "--where", "currency=USD"]).unwrap();
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(h.run(&["payments", "count", "--where", "currency=EUR"]).unwrap(), json!({ "count": 0 }));

        let updated = h.run(&["payments", "set-amount", "A1", "80.25"]).unwrap();
        assert_eq!(updated["amount"], "80.25");
        assert_eq!(h.run(&["payments", "get", "A1"]).unwrap()["amount"], "80.25");

        h.run(&["payments", "remove", "A1"]).unwrap();
        assert!(matches!(
            h.run(&["payments", "get", "A1"]),
            Err(CliError::NotFound { .. })
        ));
    }

    #[test]
    fn test_generated_id_and_method() {
        let h = Harness::new();

        let created = h
            .run(&["payments", "create", "--amount", "5", "--currency", "GBP", "--method", "cash"])
            .unwrap();

        assert!(!created["id"].as_str().unwrap().is_empty());
        assert_eq!(created["method"], "cash");
        assert_eq!(h.run(&["payments", "count", "--where", "method=4"]).unwrap(), json!({ "count": 1 }));
    }

    #[test]
    fn test_unknown_column_surfaces_and_reports() {
        let h = Harness::new();

        let err = h.run(&["parties", "find", "--where", "colour=red"]).unwrap_err();

        assert!(matches!(err, CliError::Database(_)));
        assert_reported_times(&h.sink, ErrorCategory::StatementFailed, 1);
    }

    #[test]
    fn test_malformed_predicate() {
        let h = Harness::new();
        assert!(matches!(
            h.run(&["parties", "count", "--where", "kind"]),
            Err(CliError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_null_filter_value_rejected() {
        let h = Harness::new();
        assert!(matches!(
            h.run(&["payments", "find", "--where", "reference=null"]),
            Err(CliError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_status_and_health() {
        let h = Harness::new();

        let status = h.run(&["status"]).unwrap();
        assert_eq!(status["capacity"], 4);
        assert_eq!(status["checked_out"], 0);

        let health = h.app.run(&Cli::try_parse_from(["recordctl", "health"]).unwrap().command).unwrap();
        assert!(health.success);
        assert_eq!(health.body["healthy"], true);
    }
}

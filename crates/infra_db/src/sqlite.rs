//! SQLite-backed connections
//!
//! SQLite accepts `:name` placeholders natively, so binding is a matter of
//! resolving each placeholder against the parameter record and handing the
//! values over by name. Values map onto SQLite storage classes as follows:
//!
//! | `Value` | SQLite |
//! |---|---|
//! | `Text`, `Blob` | TEXT |
//! | `Integer`, `Boolean` | INTEGER (booleans as 0/1) |
//! | `Float` | REAL |
//! | `Timestamp` | TEXT in `TIMESTAMP_FORMAT` |
//! | `Null` | NULL |

use std::path::PathBuf;
use std::time::Duration;

use core_kernel::{format_timestamp, Record, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::ToSql;
use tracing::debug;

use crate::connection::{Connection, ConnectionFactory};
use crate::error::DatabaseError;
use crate::statement::bind_parameters;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
enum SqliteTarget {
    File(PathBuf),
    Memory,
}

/// Opens SQLite connections for a pool
///
/// # Example
///
/// ```rust,ignore
/// use infra_db::{ConnectionPool, PoolConfig, SqliteConnectionFactory};
///
/// let factory = SqliteConnectionFactory::file("records.db");
/// let pool = ConnectionPool::new(PoolConfig::default(), factory, sink)?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteConnectionFactory {
    target: SqliteTarget,
    busy_timeout: Duration,
}

impl SqliteConnectionFactory {
    /// Connections to a database file, created if missing, in WAL mode
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            target: SqliteTarget::File(path.into()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Connections to private in-memory databases
    ///
    /// Each connection sees its own empty database, so this is only useful
    /// with a pool of capacity one.
    pub fn in_memory() -> Self {
        Self {
            target: SqliteTarget::Memory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// How long a statement waits on a locked database before failing
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    fn open(&self) -> rusqlite::Result<rusqlite::Connection> {
        let conn = match &self.target {
            SqliteTarget::File(path) => rusqlite::Connection::open(path)?,
            SqliteTarget::Memory => rusqlite::Connection::open_in_memory()?,
        };
        // set before the journal pragma, which itself needs a lock
        conn.busy_timeout(self.busy_timeout)?;
        if let SqliteTarget::File(_) = &self.target {
            let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
            debug!(journal_mode = %mode, "Opened SQLite database file");
        }
        Ok(conn)
    }
}

impl ConnectionFactory for SqliteConnectionFactory {
    fn connect(&self) -> Result<Box<dyn Connection>, DatabaseError> {
        let conn = self.open().map_err(|e| {
            DatabaseError::ConnectionUnavailable(format!("{}: {}", self.describe(), e))
        })?;
        Ok(Box::new(SqliteConnection::new(conn)))
    }

    fn describe(&self) -> String {
        match &self.target {
            SqliteTarget::File(path) => format!("sqlite file {}", path.display()),
            SqliteTarget::Memory => "sqlite in-memory".to_string(),
        }
    }
}

/// A single SQLite connection
pub struct SqliteConnection {
    conn: rusqlite::Connection,
    last_error: Option<DatabaseError>,
}

impl SqliteConnection {
    pub fn new(conn: rusqlite::Connection) -> Self {
        Self {
            conn,
            last_error: None,
        }
    }

    fn run_execute(&mut self, statement: &str, params: &Record) -> Result<u64, DatabaseError> {
        let bound = named_values(statement, params)?;
        let refs = as_params(&bound);
        let mut stmt = self.conn.prepare(statement)?;
        let affected = stmt.execute(refs.as_slice())?;
        Ok(affected as u64)
    }

    fn run_query(&mut self, statement: &str, params: &Record) -> Result<Vec<Record>, DatabaseError> {
        let bound = named_values(statement, params)?;
        let refs = as_params(&bound);
        let mut stmt = self.conn.prepare(statement)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
        let mut rows = stmt.query(refs.as_slice())?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (index, name) in names.iter().enumerate() {
                record.insert(name.as_str(), from_sql(row.get_ref(index)?)?);
            }
            records.push(record);
        }
        Ok(records)
    }

    fn remember<T>(&mut self, result: Result<T, DatabaseError>) -> Result<T, DatabaseError> {
        if let Err(e) = &result {
            self.last_error = Some(e.clone());
        }
        result
    }
}

impl Connection for SqliteConnection {
    fn execute(&mut self, statement: &str, params: &Record) -> Result<u64, DatabaseError> {
        let result = self.run_execute(statement, params);
        self.remember(result)
    }

    fn query(&mut self, statement: &str, params: &Record) -> Result<Vec<Record>, DatabaseError> {
        let result = self.run_query(statement, params);
        self.remember(result)
    }

    fn last_error(&self) -> Option<&DatabaseError> {
        self.last_error.as_ref()
    }
}

/// Placeholder names in SQLite form (`:name`) paired with their values
fn named_values(statement: &str, params: &Record) -> Result<Vec<(String, SqlValue)>, DatabaseError> {
    Ok(bind_parameters(statement, params)?
        .into_iter()
        .map(|(name, value)| (format!(":{}", name), to_sql(value)))
        .collect())
}

fn as_params(bound: &[(String, SqlValue)]) -> Vec<(&str, &dyn ToSql)> {
    bound
        .iter()
        .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
        .collect()
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Text(s) | Value::Blob(s) => SqlValue::Text(s.clone()),
        Value::Integer(n) => SqlValue::Integer(*n),
        Value::Float(x) => SqlValue::Real(*x),
        Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
        Value::Timestamp(ts) => SqlValue::Text(format_timestamp(ts)),
    }
}

fn from_sql(value: ValueRef<'_>) -> Result<Value, DatabaseError> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Integer(n),
        ValueRef::Real(x) => Value::Float(x),
        ValueRef::Text(bytes) => Value::Text(utf8(bytes)?),
        ValueRef::Blob(bytes) => Value::Blob(utf8(bytes)?),
    })
}

fn utf8(bytes: &[u8]) -> Result<String, DatabaseError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| DatabaseError::statement(format!("column is not valid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Box<dyn Connection> {
        SqliteConnectionFactory::in_memory().connect().unwrap()
    }

    #[test]
    fn test_named_binding_and_type_mapping() {
        let mut conn = memory();
        conn.execute(
            "CREATE TABLE t (id TEXT PRIMARY KEY, n INTEGER, x REAL, flag INTEGER, note TEXT)",
            &Record::new(),
        )
        .unwrap();

        let row = Record::new()
            .with("id", "r1")
            .with("n", 7i64)
            .with("x", 2.5)
            .with("flag", true);
        let affected = conn
            .execute("INSERT INTO t (id, n, x, flag) VALUES (:id, :n, :x, :flag)", &row)
            .unwrap();
        assert_eq!(affected, 1);

        let rows = conn
            .query("SELECT * FROM t WHERE id = :id", &Record::new().with("id", "r1"))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("n"), Some(&Value::Integer(7)));
        assert_eq!(rows[0].get("x"), Some(&Value::Float(2.5)));
        assert_eq!(rows[0].get("flag"), Some(&Value::Integer(1)));
        assert_eq!(rows[0].get("note"), Some(&Value::Null));
    }

    #[test]
    fn test_failure_keeps_connection_usable() {
        let mut conn = memory();
        let err = conn.query("SELECT * FROM missing", &Record::new()).unwrap_err();
        assert!(matches!(err, DatabaseError::StatementFailed(_)));
        assert_eq!(conn.last_error(), Some(&err));
        conn.ping().unwrap();
    }

    #[test]
    fn test_missing_parameter_is_reported() {
        let mut conn = memory();
        let err = conn.query("SELECT :a AS a", &Record::new()).unwrap_err();
        assert_eq!(err, DatabaseError::MissingParameter("a".into()));
        assert_eq!(conn.last_error(), Some(&err));
    }

    #[test]
    fn test_file_connections_share_data() {
        let dir = tempfile::tempdir().unwrap();
        let factory = SqliteConnectionFactory::file(dir.path().join("shared.db"))
            .busy_timeout(Duration::from_millis(500));
        let mut writer = factory.connect().unwrap();
        let mut reader = factory.connect().unwrap();

        writer.execute("CREATE TABLE t (id TEXT)", &Record::new()).unwrap();
        writer
            .execute("INSERT INTO t (id) VALUES (:id)", &Record::new().with("id", "a"))
            .unwrap();

        let rows = reader.query("SELECT id FROM t", &Record::new()).unwrap();
        assert_eq!(rows, vec![Record::new().with("id", "a")]);
    }

    #[test]
    fn test_unreachable_file_is_connection_unavailable() {
        let factory = SqliteConnectionFactory::file("/nonexistent-dir/sub/records.db");
        let err = factory.connect().err().unwrap();
        assert!(matches!(err, DatabaseError::ConnectionUnavailable(_)));
    }
}

//! Statement construction and named-parameter binding
//!
//! The record store never interpolates values into SQL. Every statement it
//! builds names its columns literally (after checking they are plain
//! identifiers) and refers to values through `:column` placeholders that are
//! bound from a [`Record`].

use core_kernel::{Filter, Record, Value};

use crate::error::DatabaseError;

/// Checks that `name` is a plain SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`)
pub fn validate_identifier(name: &str) -> Result<&str, DatabaseError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(name)
    } else {
        Err(DatabaseError::InvalidIdentifier(name.to_string()))
    }
}

/// Lists the distinct named placeholders in a statement, in order of first use
///
/// Quoted literals and identifiers are skipped, as are `::` type casts.
pub fn placeholders(statement: &str) -> Vec<&str> {
    let bytes = statement.as_bytes();
    let mut names: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == quote {
                        // doubled quote is an escaped quote
                        if bytes.get(i + 1) == Some(&quote) {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            b':' if bytes.get(i + 1) == Some(&b':') => i += 2,
            b':' if bytes
                .get(i + 1)
                .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_') =>
            {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                    end += 1;
                }
                let name = &statement[start..end];
                if !names.contains(&name) {
                    names.push(name);
                }
                i = end;
            }
            _ => i += 1,
        }
    }
    names
}

/// Resolves every placeholder of `statement` against `params`
///
/// Keys in `params` that the statement does not reference are ignored.
///
/// # Errors
///
/// Returns `DatabaseError::MissingParameter` for the first placeholder that
/// has no key in `params`, and `DatabaseError::NonFiniteValue` for a NaN or
/// infinite float, which SQLite would otherwise store as NULL.
pub fn bind_parameters<'a>(
    statement: &'a str,
    params: &'a Record,
) -> Result<Vec<(&'a str, &'a Value)>, DatabaseError> {
    placeholders(statement)
        .into_iter()
        .map(|name| match params.get(name) {
            None => Err(DatabaseError::MissingParameter(name.to_string())),
            Some(Value::Float(x)) if !x.is_finite() => {
                Err(DatabaseError::NonFiniteValue(name.to_string()))
            }
            Some(value) => Ok((name, value)),
        })
        .collect()
}

/// Builds the ` WHERE a = :a AND b = :b` suffix for a filter (empty for an empty filter)
pub fn where_clause(filter: &Filter) -> Result<String, DatabaseError> {
    if filter.is_empty() {
        return Ok(String::new());
    }
    let predicates = filter
        .columns()
        .map(|column| validate_identifier(column).map(|c| format!("{c} = :{c}")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!(" WHERE {}", predicates.join(" AND ")))
}

/// `INSERT INTO table (c1, c2) VALUES (:c1, :c2)` over every column of `record`
pub fn insert(table: &str, record: &Record) -> Result<String, DatabaseError> {
    let table = validate_identifier(table)?;
    if record.is_empty() {
        return Err(DatabaseError::InvalidStatement(format!(
            "nothing to insert into '{}'",
            table
        )));
    }
    let columns = record
        .columns()
        .map(validate_identifier)
        .collect::<Result<Vec<_>, _>>()?;
    let values: Vec<String> = columns.iter().map(|c| format!(":{c}")).collect();
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        values.join(", ")
    ))
}

/// `SELECT * FROM table WHERE ...`
pub fn select(table: &str, filter: &Filter) -> Result<String, DatabaseError> {
    let table = validate_identifier(table)?;
    Ok(format!("SELECT * FROM {}{}", table, where_clause(filter)?))
}

/// `SELECT COUNT(*) AS count FROM table WHERE ...`
pub fn count(table: &str, filter: &Filter) -> Result<String, DatabaseError> {
    let table = validate_identifier(table)?;
    Ok(format!(
        "SELECT COUNT(*) AS {} FROM {}{}",
        COUNT_COLUMN,
        table,
        where_clause(filter)?
    ))
}

/// Alias of the count column in [`count`] statements
pub const COUNT_COLUMN: &str = "count";

/// `UPDATE table SET a = :a, ... WHERE id = :id` over every column except the identifier
pub fn update(table: &str, record: &Record, id_column: &str) -> Result<String, DatabaseError> {
    let table = validate_identifier(table)?;
    let id_column = validate_identifier(id_column)?;
    let assignments = record
        .columns()
        .filter(|column| *column != id_column)
        .map(|column| validate_identifier(column).map(|c| format!("{c} = :{c}")))
        .collect::<Result<Vec<_>, _>>()?;
    if assignments.is_empty() {
        return Err(DatabaseError::InvalidStatement(format!(
            "no columns to update in '{}'",
            table
        )));
    }
    Ok(format!(
        "UPDATE {} SET {} WHERE {} = :{}",
        table,
        assignments.join(", "),
        id_column,
        id_column
    ))
}

/// `DELETE FROM table WHERE id = :id`
pub fn delete(table: &str, id_column: &str) -> Result<String, DatabaseError> {
    let table = validate_identifier(table)?;
    let id_column = validate_identifier(id_column)?;
    Ok(format!("DELETE FROM {} WHERE {} = :{}", table, id_column, id_column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_placeholders_skip_literals_and_casts() {
        let sql = "SELECT ':not_me', \"a:b\" FROM t WHERE x = :x AND y::text = :y OR z = :x";
        assert_eq!(placeholders(sql), vec!["x", "y"]);
    }

    #[test]
    fn test_placeholders_handle_escaped_quotes() {
        let sql = "SELECT 'it''s :fine' WHERE a = :a";
        assert_eq!(placeholders(sql), vec!["a"]);
    }

    #[test]
    fn test_bind_reports_missing_parameter() {
        let params = Record::new().with("a", 1i64);
        let err = bind_parameters("UPDATE t SET a = :a WHERE id = :id", &params).unwrap_err();
        assert_eq!(err, DatabaseError::MissingParameter("id".into()));
    }

    #[test]
    fn test_bind_ignores_unreferenced_keys() {
        let params = Record::new().with("a", 1i64).with("extra", "x");
        let bound = bind_parameters("SELECT * FROM t WHERE a = :a", &params).unwrap();
        assert_eq!(bound, vec![("a", &Value::Integer(1))]);
    }

    #[test]
    fn test_bind_rejects_non_finite_floats() {
        for x in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let params = Record::new().with("id", "P1").with("risk_score", x);
            let sql = "INSERT INTO parties (id, risk_score) VALUES (:id, :risk_score)";
            let err = bind_parameters(sql, &params).unwrap_err();
            assert_eq!(err, DatabaseError::NonFiniteValue("risk_score".into()));
        }
    }

    #[test]
    fn test_bind_ignores_unreferenced_non_finite_keys() {
        let params = Record::new().with("a", 1i64).with("rate", f64::NAN);
        assert!(bind_parameters("SELECT * FROM t WHERE a = :a", &params).is_ok());
    }

    #[test]
    fn test_insert_lists_every_column() {
        let record = Record::new().with("id", "A1").with("amount", 100.0).with("currency", "USD");
        assert_eq!(
            insert("payments", &record).unwrap(),
            "INSERT INTO payments (amount, currency, id) VALUES (:amount, :currency, :id)"
        );
    }

    #[test]
    fn test_update_excludes_identifier_from_set() {
        let record = Record::new().with("id", "A1").with("amount", 150.0);
        assert_eq!(
            update("payments", &record, "id").unwrap(),
            "UPDATE payments SET amount = :amount WHERE id = :id"
        );
    }

    #[test]
    fn test_update_with_only_identifier_is_rejected() {
        let record = Record::new().with("id", "A1");
        assert!(matches!(
            update("payments", &record, "id"),
            Err(DatabaseError::InvalidStatement(_))
        ));
    }

    #[test]
    fn test_empty_filter_has_no_where() {
        assert_eq!(select("payments", &Filter::new()).unwrap(), "SELECT * FROM payments");
        assert_eq!(
            count("payments", &Filter::new()).unwrap(),
            "SELECT COUNT(*) AS count FROM payments"
        );
    }

    #[test]
    fn test_filter_is_conjunction() {
        let filter = Filter::new().with("currency", "USD").with("status", 1i64);
        assert_eq!(
            select("payments", &filter).unwrap(),
            "SELECT * FROM payments WHERE currency = :currency AND status = :status"
        );
    }

    #[test]
    fn test_hostile_identifiers_rejected() {
        let filter = Filter::new().with("1=1; DROP TABLE payments; --", 1i64);
        assert!(matches!(
            select("payments", &filter),
            Err(DatabaseError::InvalidIdentifier(_))
        ));
        assert!(delete("pay ments", "id").is_err());
    }

    proptest! {
        #[test]
        fn prop_where_clause_binds_from_filter(columns in proptest::collection::btree_set("[a-z_][a-z0-9_]{0,10}", 0..6)) {
            let filter: Filter = columns.iter().map(|c| (c.clone(), 1i64)).collect();
            let sql = select("t", &filter).unwrap();
            let bound = bind_parameters(&sql, &filter).unwrap();
            prop_assert_eq!(bound.len(), filter.len());
        }
    }
}

//! `column=value` filter arguments
//!
//! Values are typed by shape: integers, then floats, then `true`/`false`,
//! and anything else is text. Wrapping a value in single or double quotes
//! forces text, which matters for columns stored as text that look numeric,
//! such as `amount='100.00'`.
//!
//! A bare `null` is rejected: `col = NULL` never matches a row. Quote it to
//! match the text `null`.

use core_kernel::{Filter, Value};

use crate::error::CliError;

/// Parses one `column=value` argument
pub fn parse_predicate(arg: &str) -> Result<(String, Value), CliError> {
    let invalid = |reason| CliError::InvalidFilter {
        arg: arg.to_string(),
        reason,
    };
    let (column, raw) = arg
        .split_once('=')
        .ok_or_else(|| invalid("expected column=value"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(invalid("expected column=value"));
    }
    match parse_value(raw.trim()) {
        Value::Null => Err(invalid("null never matches; quote it to match the text")),
        value => Ok((column.to_string(), value)),
    }
}

/// Builds a filter from repeated `--where` arguments
pub fn parse_filter<S: AsRef<str>>(args: &[S]) -> Result<Filter, CliError> {
    let mut filter = Filter::new();
    for arg in args {
        let (column, value) = parse_predicate(arg.as_ref())?;
        filter.insert(column, value);
    }
    Ok(filter)
}

fn parse_value(raw: &str) -> Value {
    if let Some(text) = unquote(raw) {
        return Value::Text(text.to_string());
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Integer(n);
    }
    if let Ok(x) = raw.parse::<f64>() {
        if x.is_finite() {
            return Value::Float(x);
        }
    }
    match raw {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        "null" => Value::Null,
        _ => Value::Text(raw.to_string()),
    }
}

fn unquote(raw: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|quote| {
        raw.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}

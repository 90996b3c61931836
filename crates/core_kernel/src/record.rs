//! Dynamic Record - the column-name-to-value interchange format
//!
//! A `Record` is what a codec produces from an entity, what statements bind
//! their named placeholders against, and what the store hands back for each
//! result row. Column names are unique; an absent column is distinct from a
//! column holding [`Value::Null`].

use std::collections::btree_map::{self, BTreeMap};

use serde::Serialize;

use crate::value::Value;

/// Equality-conjunction predicate expressed as a partial record
///
/// Every entry means `column = value`; an empty filter matches all rows.
pub type Filter = Record;

/// Mapping from column name to value
///
/// Columns iterate in name order so that generated statements are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    columns: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_kernel::{Record, Value};
    ///
    /// let filter = Record::new().with("currency", "USD");
    /// assert_eq!(filter.get("currency"), Some(&Value::from("USD")));
    /// ```
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Sets a column, returning the previous value if the column was present
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.columns.insert(column.into(), value.into())
    }

    /// Sets a column only when the value is present; `None` leaves the column absent
    pub fn insert_opt<V: Into<Value>>(&mut self, column: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.columns.insert(column.into(), value.into());
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.columns.remove(column)
    }

    /// Returns a copy of this record without the given column
    pub fn without(&self, column: &str) -> Record {
        let mut copy = self.clone();
        copy.columns.remove(column);
        copy
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in iteration order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.columns.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_opt_omits_none() {
        let mut record = Record::new();
        record.insert_opt("reference", None::<String>);
        record.insert_opt("memo", Some("paid"));
        assert!(!record.contains("reference"));
        assert_eq!(record.get("memo"), Some(&Value::from("paid")));
    }

    #[test]
    fn test_absent_is_not_null() {
        let record = Record::new().with("a", Value::Null);
        assert!(record.contains("a"));
        assert!(!record.contains("b"));
    }

    #[test]
    fn test_duplicate_column_replaces() {
        let mut record = Record::new().with("amount", 1i64);
        let previous = record.insert("amount", 2i64);
        assert_eq!(previous, Some(Value::Integer(1)));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_columns_iterate_in_name_order() {
        let record = Record::new().with("zeta", 1i64).with("alpha", 2i64);
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
    }
}

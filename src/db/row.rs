//! Result rows as returned by the statement executor.

use crate::error::OrmError;
use crate::schema::{FromValue, Value};
use std::collections::BTreeMap;

/// One result row: column name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    /// Builder form of [`Row::insert`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Typed value of `column`; `None` when the column is NULL.
    ///
    /// # Errors
    /// `MissingColumn` if the row has no such column, `TypeMismatch` if the value does not
    /// convert.
    pub fn try_get<T: FromValue>(&self, column: &str) -> Result<Option<T>, OrmError> {
        match self.columns.get(column) {
            None => Err(OrmError::MissingColumn(column.to_string())),
            Some(Value::Null) => Ok(None),
            Some(value) => T::from_field_value(column, value.clone()).map(Some),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Row {
            columns: iter.into_iter().collect(),
        }
    }
}

//! Result rows.

use crate::error::{SqlError, SqlResult};
use crate::value::{parse_timestamp, SqlValue};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// One row of a result set.
///
/// Column names are shared between all rows of a result set. Getters look
/// columns up by name and accept the store's native representation of a
/// type as well as the typed one: a boolean may come back as `0`/`1`, a
/// timestamp as text.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates a row. `values` must be in the order of `columns`.
    #[must_use]
    pub fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Column names, in result order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values, in result order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Whether the row has a column named `column`.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Returns the raw value of `column`.
    pub fn get(&self, column: &str) -> SqlResult<&SqlValue> {
        self.position(column)
            .map(|i| &self.values[i])
            .ok_or_else(|| SqlError::column_not_found(column))
    }

    /// Reads a non-null text column.
    pub fn text(&self, column: &str) -> SqlResult<String> {
        self.opt_text(column)?
            .ok_or_else(|| SqlError::type_mismatch(column, "text", "null"))
    }

    /// Reads a nullable text column.
    pub fn opt_text(&self, column: &str) -> SqlResult<Option<String>> {
        match self.get(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Text(s) => Ok(Some(s.clone())),
            other => Err(SqlError::type_mismatch(column, "text", other.type_name())),
        }
    }

    /// Reads a boolean column.
    pub fn bool(&self, column: &str) -> SqlResult<bool> {
        match self.get(column)? {
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::Integer(n) => Ok(*n != 0),
            other => Err(SqlError::type_mismatch(column, "bool", other.type_name())),
        }
    }

    /// Reads a non-null integer column.
    pub fn i64(&self, column: &str) -> SqlResult<i64> {
        self.opt_i64(column)?
            .ok_or_else(|| SqlError::type_mismatch(column, "integer", "null"))
    }

    /// Reads a nullable integer column.
    pub fn opt_i64(&self, column: &str) -> SqlResult<Option<i64>> {
        match self.get(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Integer(n) => Ok(Some(*n)),
            SqlValue::Bool(b) => Ok(Some(i64::from(*b))),
            other => Err(SqlError::type_mismatch(column, "integer", other.type_name())),
        }
    }

    /// Reads a non-null integer column that must fit an `i32`.
    pub fn i32(&self, column: &str) -> SqlResult<i32> {
        let value = self.i64(column)?;
        i32::try_from(value)
            .map_err(|_| SqlError::invalid_value(column, format!("{value} does not fit i32")))
    }

    /// Reads a non-null timestamp column.
    pub fn timestamp(&self, column: &str) -> SqlResult<DateTime<Utc>> {
        match self.get(column)? {
            SqlValue::Timestamp(t) => Ok(*t),
            SqlValue::Text(s) => parse_timestamp(s).ok_or_else(|| {
                SqlError::invalid_value(column, format!("'{s}' is not a timestamp"))
            }),
            other => Err(SqlError::type_mismatch(
                column,
                "timestamp",
                other.type_name(),
            )),
        }
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(column))
    }
}

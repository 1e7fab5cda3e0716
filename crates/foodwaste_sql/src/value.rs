//! Dynamic store value type.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::cmp::Ordering;
use std::fmt;

/// Format used for timestamp literals and timestamp text columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A value bound to, or read back from, a relational store.
///
/// Booleans are written as the integers `1`/`0` and timestamps as
/// `'YYYY-MM-DD HH:MM:SS'` text, which is how the target engine stores them.
/// Reading a row therefore has to accept both the typed and the native form;
/// see [`crate::Row`].
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// The explicit "no value" token.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Point in time, second precision, UTC.
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        SqlValue::Text(value.into())
    }

    /// Maps `None` to [`SqlValue::Null`].
    pub fn from_option<T: Into<SqlValue>>(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Integer(_) => "integer",
            SqlValue::Real(_) => "real",
            SqlValue::Text(_) => "text",
            SqlValue::Timestamp(_) => "timestamp",
        }
    }

    /// Get this value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value as a statement literal.
    pub fn to_literal(&self) -> String {
        self.to_string()
    }

    /// Compares two values in the order a store would sort them.
    ///
    /// Nulls sort first; booleans compare as integers; values of unrelated
    /// types compare by type name so that the ordering stays total.
    pub fn cmp_store(&self, other: &Self) -> Ordering {
        if let (Some(a), Some(b)) = (self.numeric(), other.numeric()) {
            return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        }
        match (self, other) {
            (SqlValue::Null, SqlValue::Null) => Ordering::Equal,
            (SqlValue::Null, _) => Ordering::Less,
            (_, SqlValue::Null) => Ordering::Greater,
            (SqlValue::Text(a), SqlValue::Text(b)) => a.cmp(b),
            (SqlValue::Timestamp(a), SqlValue::Timestamp(b)) => a.cmp(b),
            (a, b) => a.type_name().cmp(b.type_name()),
        }
    }

    /// Equality as the store evaluates `column = value`.
    ///
    /// Booleans and integers compare numerically, timestamps compare equal
    /// to their text rendering and `NULL` never equals anything.
    pub fn store_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SqlValue::Null, _) | (_, SqlValue::Null) => false,
            (SqlValue::Timestamp(t), SqlValue::Text(s)) | (SqlValue::Text(s), SqlValue::Timestamp(t)) => {
                t.format(TIMESTAMP_FORMAT).to_string() == *s
            }
            _ => match (self.numeric(), other.numeric()) {
                (Some(a), Some(b)) => a == b,
                _ => self == other,
            },
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn numeric(&self) -> Option<f64> {
        match self {
            SqlValue::Bool(b) => Some(f64::from(u8::from(*b))),
            SqlValue::Integer(n) => Some(*n as f64),
            SqlValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(b) => write!(f, "{}", u8::from(*b)),
            SqlValue::Integer(n) => write!(f, "{n}"),
            SqlValue::Real(r) => write!(f, "{r}"),
            SqlValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            SqlValue::Timestamp(t) => write!(f, "'{}'", t.format(TIMESTAMP_FORMAT)),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Integer(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value)
    }
}

/// Parses timestamp text in [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

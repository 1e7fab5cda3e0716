//! Error types for the sql crate.

use thiserror::Error;

/// Result type for value and row operations.
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors that can occur while reading values out of rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    /// The row has no column with the requested name.
    #[error("column not found: {column}")]
    ColumnNotFound {
        /// Name of the missing column.
        column: String,
    },

    /// The column holds a value of another type.
    #[error("type mismatch in column {column}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Name of the column.
        column: String,
        /// The requested type.
        expected: &'static str,
        /// The type actually stored.
        actual: &'static str,
    },

    /// The column holds text that cannot be parsed as the requested type.
    #[error("invalid value in column {column}: {message}")]
    InvalidValue {
        /// Name of the column.
        column: String,
        /// Description of the parse failure.
        message: String,
    },
}

impl SqlError {
    /// Create a column not found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(
        column: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected,
            actual,
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            column: column.into(),
            message: message.into(),
        }
    }
}

//! Error types for store operations.

use foodwaste_sql::{SqlError, StatementKind};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while executing statements.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The SQLite engine reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A value could not be read from a row.
    #[error("value error: {0}")]
    Sql(#[from] SqlError),

    /// A query was passed to `execute`, or a write to `query`.
    #[error("unexpected {actual} statement, expected {expected}")]
    UnexpectedStatement {
        /// What the called method accepts.
        expected: &'static str,
        /// What it was given.
        actual: StatementKind,
    },

    /// A statement referenced a column the table does not have.
    #[error("unknown column {column} in {table}")]
    UnknownColumn {
        /// Table searched.
        table: String,
        /// Column requested.
        column: String,
    },

    /// A write violated a table constraint.
    #[error("constraint violation in {table}: {message}")]
    Constraint {
        /// Table written.
        table: String,
        /// Description of the violation.
        message: String,
    },

    /// The store returned a value type the value model does not support.
    #[error("unsupported {type_name} value in column {column}")]
    UnsupportedValue {
        /// Column read.
        column: String,
        /// Store type name.
        type_name: &'static str,
    },
}

impl StoreError {
    /// Creates an unknown column error.
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a constraint violation error.
    pub fn constraint(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Constraint {
            table: table.into(),
            message: message.into(),
        }
    }
}

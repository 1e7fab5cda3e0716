//! Error types for the synchronization engine.

use foodwaste_sql::SqlError;
use foodwaste_store::StoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in engine operations.
///
/// Apart from the wrapped store errors these signal programmer or data
/// errors. They are raised before any statement that depends on the failing
/// value is built and are never retried.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Store backend error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A row value could not be read.
    #[error("value error: {0}")]
    Sql(#[from] SqlError),

    /// A required argument was not supplied.
    #[error("missing argument: {parameter}")]
    MissingArgument {
        /// Name of the parameter.
        parameter: &'static str,
    },

    /// A required identifier or value is absent.
    #[error("illegal value for {field}")]
    IllegalValue {
        /// Path of the offending field, e.g. `PrimaryFoodGroup.Identifier`.
        field: String,
    },

    /// A cursor of an unsupported type was supplied.
    #[error("wrong resource type: expected {expected}, got {actual}")]
    WrongResourceType {
        /// The supported type.
        expected: &'static str,
        /// The supplied type.
        actual: &'static str,
    },

    /// The aggregate type does not support the operation.
    #[error("{operation} is not supported by {proxy}")]
    Unsupported {
        /// Operation invoked.
        operation: &'static str,
        /// Proxy type it was invoked on.
        proxy: &'static str,
    },

    /// Relations were edited on a proxy whose stored relations were never
    /// loaded.
    #[error("{proxy} holds relation edits but its relations were not loaded")]
    RelationsNotLoaded {
        /// Proxy type.
        proxy: &'static str,
    },

    /// No row exists for the key.
    #[error("no row in {table} for key {key}")]
    NotFound {
        /// Table searched.
        table: &'static str,
        /// Canonical key searched for.
        key: String,
    },

    /// A stored key is not a canonical identifier.
    #[error("invalid key: {value}")]
    InvalidKey {
        /// The stored text.
        value: String,
    },
}

impl CoreError {
    /// Creates an illegal value error for `field`.
    pub fn illegal_value(field: impl Into<String>) -> Self {
        Self::IllegalValue {
            field: field.into(),
        }
    }

    /// Creates a missing argument error.
    pub fn missing_argument(parameter: &'static str) -> Self {
        Self::MissingArgument { parameter }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported(operation: &'static str, proxy: &'static str) -> Self {
        Self::Unsupported { operation, proxy }
    }

    /// Creates a not found error.
    pub fn not_found(table: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            table,
            key: key.into(),
        }
    }

    /// Returns the field path of an illegal value error.
    #[must_use]
    pub fn illegal_field(&self) -> Option<&str> {
        match self {
            Self::IllegalValue { field } => Some(field),
            _ => None,
        }
    }
}

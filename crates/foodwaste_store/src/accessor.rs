//! Data accessor and cursor contracts.

use crate::error::StoreResult;
use crate::reader::RowReader;
use foodwaste_sql::{Row, Statement};
use std::any::Any;

/// A session against a relational store.
///
/// An accessor executes statements one at a time. Nested reads never share
/// an accessor with a cursor that is still being consumed: a caller that
/// needs to query while iterating obtains an independent session with
/// [`DataAccessor::clone_accessor`], uses it for exactly one logical
/// operation and drops it.
///
/// # Invariants
///
/// - A clone sees every write committed through any other session
/// - Dropping a clone releases its resources
/// - `query` only accepts `SELECT`; `execute` only accepts writes
///
/// # Implementors
///
/// - [`crate::MemoryAccessor`] - In-memory tables with a statement journal
/// - [`crate::SqliteAccessor`] - SQLite database
pub trait DataAccessor: Send {
    /// Opens an independent session against the same store.
    ///
    /// # Errors
    ///
    /// Returns an error if a new session cannot be opened.
    fn clone_accessor(&self) -> StoreResult<Box<dyn DataAccessor>>;

    /// Runs a `SELECT` and returns a cursor positioned before the first row.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement is not a select or the store fails.
    fn query(&mut self, statement: &Statement) -> StoreResult<RowReader>;

    /// Runs an `INSERT`, `UPDATE` or `DELETE` and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement is a select or the store fails.
    fn execute(&mut self, statement: &Statement) -> StoreResult<u64>;

    /// Number identifying this session, for logging.
    fn session_id(&self) -> u64;
}

/// A forward-only cursor over the rows of one query.
pub trait DataReader: Any {
    /// Advances to the next row. Returns `false` once the rows are exhausted.
    fn read(&mut self) -> bool;

    /// The row the cursor is positioned on, if any.
    fn current(&self) -> Option<&Row>;

    /// Upcast used to check for the concrete cursor type.
    fn as_any(&self) -> &dyn Any;

    /// Name of the concrete cursor type, for error messages.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

//! # FoodWaste SQL
//!
//! Store values, structured statements and result rows shared by the
//! accessors and the synchronization engine.
//!
//! Statements are values, not strings: they carry static table and column
//! names plus bound [`SqlValue`]s, and render deterministically.
//!
//! ```
//! use foodwaste_sql::{ColumnRef, Select, SqlValue, Statement, TableRef};
//!
//! let stmt = Statement::Select(
//!     Select::from(TableRef::new("FoodItems"))
//!         .columns([ColumnRef::new("FoodItemIdentifier"), ColumnRef::new("IsActive")])
//!         .filter_eq(ColumnRef::new("IsActive"), true),
//! );
//! assert_eq!(
//!     stmt.sql(),
//!     "SELECT FoodItemIdentifier,IsActive FROM FoodItems WHERE IsActive=?"
//! );
//! assert_eq!(stmt.params(), vec![&SqlValue::Bool(true)]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod row;
mod statement;
mod value;

pub use error::{SqlError, SqlResult};
pub use row::Row;
pub use statement::{
    ColumnRef, Delete, Insert, Join, Predicate, Select, Statement, StatementKind, TableRef, Update,
};
pub use value::{parse_timestamp, SqlValue, TIMESTAMP_FORMAT};

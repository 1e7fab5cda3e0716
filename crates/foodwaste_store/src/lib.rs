//! # FoodWaste Store
//!
//! Data accessor contract and store implementations.
//!
//! This crate is the downstream side of the synchronization engine: it runs
//! [`foodwaste_sql::Statement`]s and hands back buffered cursors. It knows
//! nothing about proxies or relations.
//!
//! ## Design Principles
//!
//! - An accessor is a session; [`DataAccessor::clone_accessor`] opens an
//!   independent one against the same store
//! - Queries return a [`RowReader`], the one concrete cursor type
//! - Accessors do not open or commit transactions
//!
//! ## Available Stores
//!
//! - [`MemoryAccessor`] - In-memory tables with a statement journal, for tests
//! - [`SqliteAccessor`] - SQLite database file

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod accessor;
mod error;
mod memory;
mod reader;
mod sqlite;

pub use accessor::{DataAccessor, DataReader};
pub use error::{StoreError, StoreResult};
pub use memory::{JournalEntry, MemoryAccessor};
pub use reader::RowReader;
pub use sqlite::{SqliteAccessor, SqliteConfig};

//! # FoodWaste Testkit
//!
//! Test utilities for the FoodWaste synchronization engine.
//!
//! This crate provides:
//! - Stores with the full schema, in memory or in a temporary SQLite file
//! - A seeded reference data set
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use foodwaste_testkit::prelude::*;
//!
//! let store = TestStore::memory();
//! let mut repository = store.repository();
//! let fixture = Fixture::seed(&mut repository);
//! assert_eq!(repository.root_food_groups().unwrap().len(), 2);
//! # let _ = fixture;
//! ```

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;

//! # FoodWaste Core
//!
//! Relational synchronization engine for the FoodWaste domain.
//!
//! Aggregates (food items, food groups, households and their supporting
//! objects) are represented as data proxies. A proxy maps its own row from
//! a cursor, loads related objects through cloned accessor sessions and,
//! when saved, reconciles the stored relation rows with its in-memory
//! relations by writing only the difference.
//!
//! ## Layout
//!
//! - [`identity`] - Identifiers and their canonical key form
//! - [`schema`] - Tables and DDL
//! - [`builder`] - Statements from table schemas
//! - [`proxy`] - The [`DataProxy`] protocol and every aggregate
//! - [`sync`] - Relation reconciliation
//! - [`Repository`] - Aggregate-level get, add, save and delete

pub mod builder;
mod config;
mod error;
pub mod identity;
pub mod load;
pub mod proxy;
mod repository;
pub mod schema;
mod state;
pub mod sync;

pub use config::EngineConfig;
pub use error::{CoreError, CoreResult};
pub use identity::{format_key, ProxyId};
pub use proxy::{
    Capability, DataProviderProxy, DataProxy, FoodGroupProxy, FoodItemGroupProxy, FoodItemProxy,
    ForeignKeyProxy, HouseholdMemberProxy, HouseholdProxy, MemberOfHouseholdProxy, Membership,
    RowView, StaticTextProxy, StorageProxy, StorageTypeProxy, TemperatureRange, TranslationInfoProxy,
    TranslationProxy,
};
pub use repository::Repository;
pub use state::HydrationState;
pub use sync::SyncReport;

//! Reconciliation of stored relation rows with in-memory relations.
//!
//! A save never rewrites a relation wholesale. The stored rows are loaded,
//! diffed against the desired set by target identifier, and only the
//! difference is written:
//!
//! - targets that are new get a row inserted;
//! - targets that are gone get their row deleted;
//! - targets whose payload (such as a primary flag) changed get an update;
//! - everything else is left alone.
//!
//! The load runs on one accessor clone, inserts and deletes share a second
//! and updates a third. Clones are only opened for work that exists, so a
//! save that changes nothing issues exactly one query.

mod children;
mod membership;
mod plan;

pub use children::{delete_all, sync_children, validate_children, OwnedChild};
pub use membership::{reconcile, Association, AssociationRow, Link};
pub use plan::{plan, Plan};

use crate::builder;
use crate::error::CoreResult;
use crate::identity::ProxyId;
use crate::schema::TableSchema;
use foodwaste_sql::SqlValue;
use foodwaste_store::DataAccessor;
use std::ops::AddAssign;

/// Counts of the writes a reconciliation performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Rows inserted.
    pub inserted: usize,
    /// Rows updated.
    pub updated: usize,
    /// Rows deleted.
    pub deleted: usize,
    /// Rows that already matched.
    pub unchanged: usize,
}

impl SyncReport {
    /// Whether nothing was written.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.deleted == 0
    }

    /// Total number of write statements.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }
}

impl AddAssign for SyncReport {
    fn add_assign(&mut self, other: Self) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.unchanged += other.unchanged;
    }
}

/// Rows to write to one table, as keys and schema-ordered values.
#[derive(Debug, Default)]
struct WriteSet {
    deletes: Vec<ProxyId>,
    updates: Vec<Vec<SqlValue>>,
    inserts: Vec<Vec<SqlValue>>,
    unchanged: usize,
}

impl WriteSet {
    /// Executes the writes. Deletes run first and inserts last, so a
    /// replaced row never coexists with its replacement.
    fn apply(self, schema: &TableSchema, accessor: &dyn DataAccessor) -> CoreResult<SyncReport> {
        let mut writes = if self.inserts.is_empty() && self.deletes.is_empty() {
            None
        } else {
            Some(accessor.clone_accessor()?)
        };
        let mut updates = if self.updates.is_empty() {
            None
        } else {
            Some(accessor.clone_accessor()?)
        };

        let report = SyncReport {
            inserted: self.inserts.len(),
            updated: self.updates.len(),
            deleted: self.deletes.len(),
            unchanged: self.unchanged,
        };
        if let Some(session) = writes.as_mut() {
            for id in &self.deletes {
                session.execute(&builder::delete(schema, &id.to_key()))?;
            }
        }
        if let Some(session) = updates.as_mut() {
            for values in self.updates {
                session.execute(&builder::update(schema, values))?;
            }
        }
        if let Some(session) = writes.as_mut() {
            for values in self.inserts {
                session.execute(&builder::insert(schema, values))?;
            }
        }
        Ok(report)
    }
}

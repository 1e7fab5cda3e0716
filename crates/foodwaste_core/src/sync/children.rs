//! Collections of rows owned by a single aggregate.

use super::{plan, SyncReport, WriteSet};
use crate::error::{CoreError, CoreResult};
use crate::identity::{require_id, ProxyId};
use crate::load::load_all;
use crate::proxy::DataProxy;
use foodwaste_sql::Statement;
use foodwaste_store::DataAccessor;
use tracing::debug;

/// A proxy stored as a dependent row of an owner, such as a translation.
pub trait OwnedChild: DataProxy {
    /// Points the row at its owner.
    fn set_owner(&mut self, owner: ProxyId);

    /// Checks the keys the row needs besides its own and its owner's.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalValue`] naming the missing key.
    fn check(&self) -> CoreResult<()> {
        Ok(())
    }
}

/// Checks every child, prefixing failing field paths with `path[]`.
///
/// # Errors
///
/// Returns the first child's [`CoreError::IllegalValue`].
pub fn validate_children<C: OwnedChild>(children: &[C], path: &str) -> CoreResult<()> {
    for child in children {
        child.check().map_err(|err| match err {
            CoreError::IllegalValue { field } => {
                CoreError::illegal_value(format!("{path}[].{field}"))
            }
            other => other,
        })?;
    }
    Ok(())
}

/// Makes the owner's stored children equal `children`.
///
/// Children are matched by their own identifier; children without one are
/// assigned a fresh identifier first. A stored child whose columns differ
/// from the in-memory one is updated in place.
///
/// # Errors
///
/// Returns an error if a key is missing or a statement fails.
pub fn sync_children<C: OwnedChild>(
    owner: ProxyId,
    children: &mut [C],
    existing: &Statement,
    accessor: &dyn DataAccessor,
) -> CoreResult<SyncReport> {
    let mut desired = Vec::with_capacity(children.len());
    for child in children.iter_mut() {
        if child.identifier().is_none() {
            child.set_identifier(ProxyId::new());
        }
        child.set_owner(owner);
        desired.push((require_id(child.identifier(), "Identifier")?, child.column_values()?));
    }

    let stored: Vec<C> = load_all(accessor, existing)?;
    let mut current = Vec::with_capacity(stored.len());
    for row in &stored {
        let id = require_id(row.identifier(), "Identifier")?;
        current.push((id, (id, row.column_values()?)));
    }

    let diff = plan(desired, current, |wanted, (_, stored)| wanted == stored);
    let mut writes = WriteSet {
        unchanged: diff.unchanged,
        ..WriteSet::default()
    };
    writes.deletes = diff.deletes.into_iter().map(|(id, _)| id).collect();
    writes.updates = diff.updates.into_iter().map(|(wanted, _)| wanted).collect();
    writes.inserts = diff.inserts;

    let report = writes.apply(&C::SCHEMA, accessor)?;
    debug!(
        table = C::SCHEMA.name,
        owner = %owner,
        inserted = report.inserted,
        updated = report.updated,
        deleted = report.deleted,
        unchanged = report.unchanged,
        "children synchronized"
    );
    Ok(report)
}

/// Deletes every row returned by `existing`, relations first.
///
/// Returns the number of rows deleted. No session is opened for writing
/// when the query returns nothing.
///
/// # Errors
///
/// Returns an error if a statement fails.
pub fn delete_all<C: DataProxy>(existing: &Statement, accessor: &dyn DataAccessor) -> CoreResult<u64> {
    let rows: Vec<C> = load_all(accessor, existing)?;
    if rows.is_empty() {
        return Ok(0);
    }
    let mut session = accessor.clone_accessor()?;
    let mut deleted = 0;
    for mut row in rows {
        row.delete_relations(accessor)?;
        deleted += session.execute(&row.build_delete()?)?;
    }
    debug!(table = C::SCHEMA.name, deleted, "rows deleted");
    Ok(deleted)
}

//! Many-to-many associations stored as relation rows.

use super::{plan, SyncReport, WriteSet};
use crate::error::CoreResult;
use crate::identity::{require_id, ProxyId};
use crate::load::load_all;
use crate::proxy::DataProxy;
use foodwaste_sql::Statement;
use foodwaste_store::DataAccessor;
use std::fmt;
use tracing::debug;

/// A proxy for a relation row linking an owner to a target.
pub trait AssociationRow: DataProxy {
    /// Data carried by the link besides the two keys.
    type Payload: Clone + PartialEq + fmt::Debug;

    /// The row's payload.
    fn payload(&self) -> Self::Payload;

    /// Replaces the row's payload.
    fn set_payload(&mut self, payload: Self::Payload);
}

/// A desired link to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link<P> {
    /// Identifier of the linked aggregate.
    pub target: ProxyId,
    /// Link payload.
    pub payload: P,
}

impl<P> Link<P> {
    /// Creates a link.
    pub fn new(target: ProxyId, payload: P) -> Self {
        Self { target, payload }
    }
}

/// How an owner's relation rows are found and created.
pub struct Association<R: AssociationRow> {
    /// Name used in logs.
    pub name: &'static str,
    /// Query returning the owner's stored relation rows.
    pub existing: Statement,
    /// Target of a stored row.
    pub target_of: fn(&R) -> Option<ProxyId>,
    /// Builds a new row from owner, target and payload.
    pub link: fn(ProxyId, ProxyId, R::Payload) -> R,
}

/// Makes the owner's stored links equal `desired`.
///
/// New rows get a fresh identifier. Stored rows without a target are
/// treated as stale and deleted.
///
/// # Errors
///
/// Returns an error if a statement fails.
pub fn reconcile<R: AssociationRow>(
    owner: ProxyId,
    desired: Vec<Link<R::Payload>>,
    association: &Association<R>,
    accessor: &dyn DataAccessor,
) -> CoreResult<SyncReport> {
    let stored: Vec<R> = load_all(accessor, &association.existing)?;
    let mut existing = Vec::with_capacity(stored.len());
    let mut stale = Vec::new();
    for row in stored {
        match (association.target_of)(&row) {
            Some(target) => existing.push((target, row)),
            None => stale.push(row),
        }
    }

    let diff = plan(
        desired.into_iter().map(|link| (link.target, link)),
        existing,
        |link, row| link.payload == row.payload(),
    );

    let mut writes = WriteSet {
        unchanged: diff.unchanged,
        ..WriteSet::default()
    };
    for row in diff.deletes.iter().chain(stale.iter()) {
        writes.deletes.push(require_id(row.identifier(), "Identifier")?);
    }
    for (link, mut row) in diff.updates {
        row.set_payload(link.payload);
        writes.updates.push(row.column_values()?);
    }
    for link in diff.inserts {
        let mut row = (association.link)(owner, link.target, link.payload);
        if row.identifier().is_none() {
            row.set_identifier(ProxyId::new());
        }
        writes.inserts.push(row.column_values()?);
    }

    let report = writes.apply(&R::SCHEMA, accessor)?;
    debug!(
        association = association.name,
        owner = %owner,
        inserted = report.inserted,
        updated = report.updated,
        deleted = report.deleted,
        unchanged = report.unchanged,
        "association reconciled"
    );
    Ok(report)
}

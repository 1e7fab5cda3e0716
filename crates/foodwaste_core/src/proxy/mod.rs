//! Data proxies: aggregates that know how to load and persist themselves.
//!
//! Every proxy is a plain value with an optional identifier and a
//! [`HydrationState`]. Loading is two-phase:
//!
//! 1. [`DataProxy::map_data`] copies the proxy's own columns from the
//!    current row of a cursor. No I/O.
//! 2. [`DataProxy::map_relations`] fetches related objects. Each query runs
//!    on its own clone of the accessor, so it never disturbs a cursor the
//!    caller is still iterating.
//!
//! Persisting is split the same way: the repository writes the proxy's own
//! row from [`DataProxy::build_insert`] or [`DataProxy::build_update`], then
//! [`DataProxy::save_relations`] reconciles the stored relation rows with
//! the in-memory collections.

mod data_provider;
mod food_group;
mod food_item;
mod food_item_group;
mod foreign_key;
mod household;
mod household_member;
mod member_of_household;
mod static_text;
mod storage;
mod storage_type;
mod translation;
mod translation_info;

pub use data_provider::DataProviderProxy;
pub use food_group::FoodGroupProxy;
pub use food_item::FoodItemProxy;
pub use food_item_group::FoodItemGroupProxy;
pub use foreign_key::ForeignKeyProxy;
pub use household::HouseholdProxy;
pub use household_member::{HouseholdMemberProxy, Membership};
pub use member_of_household::MemberOfHouseholdProxy;
pub use static_text::StaticTextProxy;
pub use storage::StorageProxy;
pub use storage_type::{StorageTypeProxy, TemperatureRange};
pub use translation::TranslationProxy;
pub use translation_info::TranslationInfoProxy;

use crate::builder;
use crate::error::{CoreError, CoreResult};
use crate::identity::{format_key, require_id, ProxyId};
use crate::schema::TableSchema;
use crate::state::HydrationState;
use chrono::{DateTime, Utc};
use foodwaste_sql::{Row, SqlValue, Statement};
use foodwaste_store::{DataAccessor, DataReader, RowReader};
use std::fmt;
use tracing::trace;

/// Whether an aggregate may be written through the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Rows and relations may be inserted, updated and deleted.
    Mutable,
    /// Read-only system data. Saving or deleting relations is rejected.
    ReferenceData,
}

/// A persistable aggregate.
///
/// Implementors supply the column mapping and the relation hooks
/// (`load_relations`, `validate_relations`, `store_relations`,
/// `remove_relations`); the provided methods implement the guards and
/// state transitions shared by all proxies.
///
/// # Invariants
///
/// - `column_values` returns one value per `SCHEMA.columns` entry, in order
/// - `read_columns` reads only the current row and performs no I/O
/// - relation hooks obtain a fresh accessor clone for every query
///
/// # Errors
///
/// Operations that need the proxy's key fail with
/// [`CoreError::IllegalValue`] naming `Identifier` when it is absent.
/// Mutating operations on [`Capability::ReferenceData`] proxies fail with
/// [`CoreError::Unsupported`] before any other check.
pub trait DataProxy: Default + fmt::Debug + Send {
    /// Type name used in errors and logs.
    const NAME: &'static str;
    /// Table the proxy's own row lives in.
    const SCHEMA: TableSchema;
    /// Write capability of the aggregate.
    const CAPABILITY: Capability = Capability::Mutable;

    /// The proxy's identifier.
    fn identifier(&self) -> Option<ProxyId>;

    /// Sets the proxy's identifier.
    fn set_identifier(&mut self, id: ProxyId);

    /// Current hydration state.
    fn state(&self) -> HydrationState;

    /// Records a hydration state transition.
    fn set_state(&mut self, state: HydrationState);

    /// Own column values in schema order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalValue`] if a required key is absent.
    fn column_values(&self) -> CoreResult<Vec<SqlValue>>;

    /// Copies own columns from a row.
    ///
    /// # Errors
    ///
    /// Returns an error if a column is missing or has the wrong type.
    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()>;

    /// Fetches related objects for the proxy keyed by `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if a relation query fails.
    fn load_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        let _ = (id, accessor);
        Ok(())
    }

    /// Checks that every relation to be written has the keys it needs.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalValue`] naming the first missing key.
    fn validate_relations(&self) -> CoreResult<()> {
        Ok(())
    }

    /// Brings stored relation rows in line with the in-memory relations.
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails.
    fn store_relations(
        &mut self,
        id: ProxyId,
        accessor: &dyn DataAccessor,
        is_new: bool,
    ) -> CoreResult<()> {
        let _ = (id, accessor, is_new);
        Ok(())
    }

    /// Deletes the rows that depend on the proxy's row.
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails.
    fn remove_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        let _ = (id, accessor);
        Ok(())
    }

    /// Whether any collection `store_relations` writes is non-empty.
    fn holds_relations(&self) -> bool {
        false
    }

    /// Fails if relations were edited before they were loaded.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RelationsNotLoaded`] for a proxy in state
    /// [`HydrationState::ScalarsLoaded`] whose relation collections are not
    /// empty.
    fn ensure_relations_loaded(&self) -> CoreResult<()> {
        if self.state() == HydrationState::ScalarsLoaded && self.holds_relations() {
            return Err(CoreError::RelationsNotLoaded { proxy: Self::NAME });
        }
        Ok(())
    }

    /// A query prototype carrying only an identifier.
    #[must_use]
    fn keyed(id: ProxyId) -> Self {
        let mut proxy = Self::default();
        proxy.set_identifier(id);
        proxy
    }

    /// Canonical key of the proxy.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalValue`] if the identifier is absent.
    fn unique_id(&self) -> CoreResult<String> {
        format_key(self.identifier(), "Identifier")
    }

    /// Statement reading the proxy's row.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalValue`] if the identifier is absent.
    fn build_select(&self) -> CoreResult<Statement> {
        Ok(builder::select_by_key(&Self::SCHEMA, &self.unique_id()?))
    }

    /// Statement inserting the proxy's row.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalValue`] if a required key is absent.
    fn build_insert(&self) -> CoreResult<Statement> {
        Ok(builder::insert(&Self::SCHEMA, self.column_values()?))
    }

    /// Statement updating the proxy's row.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalValue`] if a required key is absent.
    fn build_update(&self) -> CoreResult<Statement> {
        Ok(builder::update(&Self::SCHEMA, self.column_values()?))
    }

    /// Statement deleting the proxy's row.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalValue`] if the identifier is absent.
    fn build_delete(&self) -> CoreResult<Statement> {
        Ok(builder::delete(&Self::SCHEMA, &self.unique_id()?))
    }

    /// Phase one: copies own columns from the cursor's current row.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::WrongResourceType`] for a foreign cursor type,
    /// [`CoreError::MissingArgument`] if the cursor has no current row.
    fn map_data(&mut self, reader: &dyn DataReader, accessor: &dyn DataAccessor) -> CoreResult<()> {
        let _ = accessor;
        let row = current_row(reader)?;
        self.read_columns(&RowView::new(row))?;
        self.set_state(HydrationState::ScalarsLoaded);
        trace!(proxy = Self::NAME, id = ?self.identifier(), "scalars loaded");
        Ok(())
    }

    /// Phase two: fetches related objects.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalValue`] if the identifier is absent; no
    /// query is issued in that case.
    fn map_relations(&mut self, accessor: &dyn DataAccessor) -> CoreResult<()> {
        let id = require_id(self.identifier(), "Identifier")?;
        self.load_relations(id, accessor)?;
        self.set_state(HydrationState::RelationsLoaded);
        trace!(proxy = Self::NAME, id = %id, "relations loaded");
        Ok(())
    }

    /// Builds a fully hydrated proxy from the cursor's current row.
    ///
    /// `column_names` renames the proxy's own columns positionally, for rows
    /// where they carry aliases; names not given keep their schema name.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`DataProxy::map_data`] and
    /// [`DataProxy::map_relations`].
    fn create(
        &self,
        reader: &dyn DataReader,
        accessor: &dyn DataAccessor,
        column_names: &[&str],
    ) -> CoreResult<Self> {
        let row = current_row(reader)?;
        let mut proxy = Self::default();
        proxy.read_columns(&RowView::renamed(row, Self::SCHEMA.columns, column_names))?;
        proxy.set_state(HydrationState::ScalarsLoaded);
        proxy.map_relations(accessor)?;
        Ok(proxy)
    }

    /// Persists relations after the proxy's own row was written.
    ///
    /// A proxy whose relations were never loaded and that holds no relation
    /// edits loads them first, so that saving it leaves the stored relations
    /// as they were. One that does hold edits is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Unsupported`] for reference data,
    /// [`CoreError::RelationsNotLoaded`] for edits made before loading and
    /// [`CoreError::IllegalValue`] for a missing key. All are raised before
    /// any query.
    fn save_relations(&mut self, accessor: &dyn DataAccessor, is_new: bool) -> CoreResult<()> {
        ensure_mutable::<Self>("SaveRelations")?;
        let id = require_id(self.identifier(), "Identifier")?;
        self.ensure_relations_loaded()?;
        self.validate_relations()?;
        if self.state() == HydrationState::ScalarsLoaded {
            self.map_relations(accessor)?;
        }
        self.store_relations(id, accessor, is_new)
    }

    /// Removes dependent rows before the proxy's own row is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Unsupported`] for reference data and
    /// [`CoreError::IllegalValue`] for a missing identifier.
    fn delete_relations(&mut self, accessor: &dyn DataAccessor) -> CoreResult<()> {
        ensure_mutable::<Self>("DeleteRelations")?;
        let id = require_id(self.identifier(), "Identifier")?;
        self.remove_relations(id, accessor)
    }
}

/// Fails with [`CoreError::Unsupported`] unless `P` is mutable.
///
/// # Errors
///
/// See above.
pub fn ensure_mutable<P: DataProxy>(operation: &'static str) -> CoreResult<()> {
    match P::CAPABILITY {
        Capability::Mutable => Ok(()),
        Capability::ReferenceData => Err(CoreError::unsupported(operation, P::NAME)),
    }
}

/// The row a cursor is positioned on.
///
/// # Errors
///
/// Returns [`CoreError::WrongResourceType`] unless the cursor is a
/// [`RowReader`] and [`CoreError::MissingArgument`] if it has no current row.
pub fn current_row(reader: &dyn DataReader) -> CoreResult<&Row> {
    let Some(rows) = reader.as_any().downcast_ref::<RowReader>() else {
        return Err(CoreError::WrongResourceType {
            expected: std::any::type_name::<RowReader>(),
            actual: reader.type_name(),
        });
    };
    rows.current().ok_or(CoreError::missing_argument("reader"))
}

/// A row seen through a proxy's column names.
///
/// Columns are addressed by their schema name. A renamed view maps schema
/// names onto the names the row actually carries, which lets a proxy read
/// its columns out of a join where they were aliased.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    row: &'a Row,
    canonical: &'a [&'a str],
    names: &'a [&'a str],
}

impl<'a> RowView<'a> {
    /// A view using the row's own column names.
    #[must_use]
    pub fn new(row: &'a Row) -> Self {
        Self {
            row,
            canonical: &[],
            names: &[],
        }
    }

    /// A view where `canonical[i]` is read from column `names[i]`.
    #[must_use]
    pub fn renamed(row: &'a Row, canonical: &'a [&'a str], names: &'a [&'a str]) -> Self {
        Self {
            row,
            canonical,
            names,
        }
    }

    /// The underlying row.
    #[must_use]
    pub fn row(&self) -> &'a Row {
        self.row
    }

    /// Name of the row column holding `column`.
    #[must_use]
    pub fn name<'b>(&self, column: &'b str) -> &'b str
    where
        'a: 'b,
    {
        self.canonical
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .and_then(|i| self.names.get(i).copied())
            .unwrap_or(column)
    }

    /// Whether the row holds `column`.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.row.contains(self.name(column))
    }

    /// Reads a non-null text column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not text.
    pub fn text(&self, column: &str) -> CoreResult<String> {
        Ok(self.row.text(self.name(column))?)
    }

    /// Reads a nullable text column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not text.
    pub fn opt_text(&self, column: &str) -> CoreResult<Option<String>> {
        Ok(self.row.opt_text(self.name(column))?)
    }

    /// Reads a boolean column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not boolean.
    pub fn bool(&self, column: &str) -> CoreResult<bool> {
        Ok(self.row.bool(self.name(column))?)
    }

    /// Reads an `i32` column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or out of range.
    pub fn i32(&self, column: &str) -> CoreResult<i32> {
        Ok(self.row.i32(self.name(column))?)
    }

    /// Reads a timestamp column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not a timestamp.
    pub fn timestamp(&self, column: &str) -> CoreResult<DateTime<Utc>> {
        Ok(self.row.timestamp(self.name(column))?)
    }

    /// Reads a key column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not a canonical key.
    pub fn id(&self, column: &str) -> CoreResult<ProxyId> {
        ProxyId::parse_key(&self.text(column)?)
    }

    /// Reads a nullable key column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not a canonical key.
    pub fn opt_id(&self, column: &str) -> CoreResult<Option<ProxyId>> {
        self.opt_text(column)?
            .map(|key| ProxyId::parse_key(&key))
            .transpose()
    }
}

/// Hydrates a proxy's scalars from a row it shares with other tables.
///
/// # Errors
///
/// Returns an error if a column is missing or has the wrong type.
pub fn hydrate<P: DataProxy>(row: &Row, column_names: &[&str]) -> CoreResult<P> {
    let mut proxy = P::default();
    proxy.read_columns(&RowView::renamed(row, P::SCHEMA.columns, column_names))?;
    proxy.set_state(HydrationState::ScalarsLoaded);
    Ok(proxy)
}

/// Key of an optional related proxy, as a statement value.
pub(crate) fn key_value(id: Option<ProxyId>, field: &str) -> CoreResult<SqlValue> {
    format_key(id, field).map(SqlValue::Text)
}

/// Key of an optional related proxy that may be absent.
pub(crate) fn opt_key_value(id: Option<ProxyId>) -> SqlValue {
    id.map_or(SqlValue::Null, SqlValue::from)
}

/// Current time at the precision the store keeps.
pub(crate) fn now() -> DateTime<Utc> {
    truncate(Utc::now())
}

/// Drops sub-second precision.
#[must_use]
pub fn truncate(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodwaste_sql::Row;
    use foodwaste_store::MemoryAccessor;
    use std::any::Any;
    use std::sync::Arc;

    struct OtherReader;

    impl DataReader for OtherReader {
        fn read(&mut self) -> bool {
            false
        }

        fn current(&self) -> Option<&Row> {
            None
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn reader(columns: &[&str], values: Vec<SqlValue>) -> RowReader {
        let columns: Arc<[String]> = columns.iter().map(|c| (*c).to_string()).collect();
        RowReader::new(Arc::clone(&columns), vec![Row::new(columns, values)])
    }

    #[test]
    fn foreign_cursor_is_rejected() {
        let accessor = MemoryAccessor::new();
        let mut proxy = FoodItemProxy::default();
        let err = proxy.map_data(&OtherReader, &accessor).unwrap_err();
        assert!(matches!(err, CoreError::WrongResourceType { .. }));
    }

    #[test]
    fn cursor_without_row_is_missing() {
        let accessor = MemoryAccessor::new();
        let rows = reader(&["FoodItemIdentifier", "IsActive"], vec![
            SqlValue::text("11111111-1111-1111-1111-111111111111"),
            SqlValue::Integer(1),
        ]);
        let mut proxy = FoodItemProxy::default();
        let err = proxy.map_data(&rows, &accessor).unwrap_err();
        assert!(matches!(err, CoreError::MissingArgument { parameter: "reader" }));
    }

    #[test]
    fn map_data_moves_to_scalars_loaded() {
        let accessor = MemoryAccessor::new();
        let mut rows = reader(&["FoodItemIdentifier", "IsActive"], vec![
            SqlValue::text("11111111-1111-1111-1111-111111111111"),
            SqlValue::Integer(1),
        ]);
        assert!(rows.read());
        let mut proxy = FoodItemProxy::default();
        proxy.map_data(&rows, &accessor).unwrap();
        assert_eq!(proxy.state(), HydrationState::ScalarsLoaded);
        assert!(proxy.is_active);
        assert!(accessor.journal().is_empty());
    }

    #[test]
    fn renamed_view_reads_aliases() {
        let columns: Arc<[String]> = ["Id", "Active"].iter().map(|c| (*c).to_string()).collect();
        let row = Row::new(columns, vec![SqlValue::text("x"), SqlValue::Bool(true)]);
        let view = RowView::renamed(&row, &["FoodItemIdentifier", "IsActive"], &["Id", "Active"]);
        assert_eq!(view.name("IsActive"), "Active");
        assert!(view.bool("IsActive").unwrap());
        assert!(view.contains("FoodItemIdentifier"));
        assert!(!view.contains("Value"));
    }

    #[test]
    fn truncate_drops_nanoseconds() {
        let time = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        assert_eq!(truncate(time).timestamp_subsec_nanos(), 0);
        assert_eq!(truncate(time).timestamp(), 1_700_000_000);
    }

    #[test]
    fn reference_data_is_not_mutable() {
        let err = ensure_mutable::<StaticTextProxy>("SaveRelations").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Unsupported {
                operation: "SaveRelations",
                proxy: "StaticTextProxy"
            }
        ));
        assert!(ensure_mutable::<FoodItemProxy>("SaveRelations").is_ok());
    }
}

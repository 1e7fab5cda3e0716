use super::{Capability, DataProxy, RowView, TranslationProxy};
use crate::builder;
use crate::error::CoreResult;
use crate::identity::ProxyId;
use crate::load::load_all;
use crate::schema::{TableSchema, STORAGE_TYPES};
use crate::state::HydrationState;
use foodwaste_sql::{ColumnRef, SqlValue, Statement};
use foodwaste_store::DataAccessor;

/// Inclusive temperature range in degrees Celsius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemperatureRange {
    /// Lowest allowed temperature.
    pub start: i32,
    /// Highest allowed temperature.
    pub end: i32,
}

impl TemperatureRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Whether `temperature` lies within the range.
    #[must_use]
    pub const fn contains(&self, temperature: i32) -> bool {
        temperature >= self.start && temperature <= self.end
    }
}

/// A kind of storage, such as a refrigerator. Reference data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageTypeProxy {
    identifier: Option<ProxyId>,
    /// Display order.
    pub sort_order: i32,
    /// Default temperature.
    pub temperature: i32,
    /// Allowed temperatures.
    pub temperature_range: TemperatureRange,
    /// Whether households may create storages of this type.
    pub creatable: bool,
    /// Whether such storages may be edited.
    pub editable: bool,
    /// Whether such storages may be deleted.
    pub deletable: bool,
    /// Translated names.
    pub translations: Vec<TranslationProxy>,
    state: HydrationState,
}

impl StorageTypeProxy {
    /// Creates a storage type.
    pub fn new(
        identifier: ProxyId,
        sort_order: i32,
        temperature: i32,
        temperature_range: TemperatureRange,
        creatable: bool,
        editable: bool,
        deletable: bool,
    ) -> Self {
        Self {
            identifier: Some(identifier),
            sort_order,
            temperature,
            temperature_range,
            creatable,
            editable,
            deletable,
            translations: Vec::new(),
            state: HydrationState::RelationsLoaded,
        }
    }

    /// Selects every storage type in display order.
    #[must_use]
    pub fn select_all() -> Statement {
        builder::select_all(&STORAGE_TYPES)
            .order_by(ColumnRef::new("SortOrder"))
            .into()
    }
}

impl DataProxy for StorageTypeProxy {
    const NAME: &'static str = "StorageTypeProxy";
    const SCHEMA: TableSchema = STORAGE_TYPES;
    const CAPABILITY: Capability = Capability::ReferenceData;

    fn identifier(&self) -> Option<ProxyId> {
        self.identifier
    }

    fn set_identifier(&mut self, id: ProxyId) {
        self.identifier = Some(id);
    }

    fn state(&self) -> HydrationState {
        self.state
    }

    fn set_state(&mut self, state: HydrationState) {
        self.state = state;
    }

    fn column_values(&self) -> CoreResult<Vec<SqlValue>> {
        Ok(vec![
            SqlValue::text(self.unique_id()?),
            SqlValue::from(self.sort_order),
            SqlValue::from(self.temperature),
            SqlValue::from(self.temperature_range.start),
            SqlValue::from(self.temperature_range.end),
            SqlValue::Bool(self.creatable),
            SqlValue::Bool(self.editable),
            SqlValue::Bool(self.deletable),
        ])
    }

    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()> {
        self.identifier = Some(row.id("StorageTypeIdentifier")?);
        self.sort_order = row.i32("SortOrder")?;
        self.temperature = row.i32("Temperature")?;
        self.temperature_range = TemperatureRange::new(
            row.i32("TemperatureRangeStartValue")?,
            row.i32("TemperatureRangeEndValue")?,
        );
        self.creatable = row.bool("Creatable")?;
        self.editable = row.bool("Editable")?;
        self.deletable = row.bool("Deletable")?;
        Ok(())
    }

    fn load_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        self.translations = load_all(accessor, &TranslationProxy::select_for(&id.to_key()))?;
        Ok(())
    }
}

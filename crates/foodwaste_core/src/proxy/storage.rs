use super::{hydrate, key_value, truncate, DataProxy, RowView, StorageTypeProxy};
use crate::builder;
use crate::error::CoreResult;
use crate::identity::ProxyId;
use crate::load::load_one;
use crate::schema::{TableSchema, STORAGES, STORAGE_TYPES};
use crate::state::HydrationState;
use crate::sync::OwnedChild;
use chrono::{DateTime, Utc};
use foodwaste_sql::{Select, SqlValue, Statement};
use foodwaste_store::DataAccessor;

/// Names the storage type columns carry when joined with storages.
const JOINED_TYPE_COLUMNS: &[&str] = &[
    "StorageTypeIdentifier",
    "StorageTypeSortOrder",
    "StorageTypeTemperature",
    "TemperatureRangeStartValue",
    "TemperatureRangeEndValue",
    "Creatable",
    "Editable",
    "Deletable",
];

/// A storage in a household, such as its refrigerator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageProxy {
    identifier: Option<ProxyId>,
    /// Identifier of the owning household.
    pub household_identifier: Option<ProxyId>,
    /// Display order within the household.
    pub sort_order: i32,
    /// Kind of storage.
    pub storage_type: StorageTypeProxy,
    /// Optional description.
    pub description: Option<String>,
    /// Current temperature.
    pub temperature: i32,
    /// Creation time, second precision.
    pub creation_time: DateTime<Utc>,
    state: HydrationState,
}

impl StorageProxy {
    /// Creates a storage. The identifier is assigned on save if absent.
    pub fn new(
        identifier: Option<ProxyId>,
        household_identifier: Option<ProxyId>,
        sort_order: i32,
        storage_type: StorageTypeProxy,
        description: Option<String>,
        temperature: i32,
        creation_time: DateTime<Utc>,
    ) -> Self {
        Self {
            identifier,
            household_identifier,
            sort_order,
            storage_type,
            description,
            temperature,
            creation_time: truncate(creation_time),
            state: HydrationState::RelationsLoaded,
        }
    }

    /// Selects the storages of a household with their types, in display order.
    #[must_use]
    pub fn select_for_household(household: &str) -> Statement {
        joined()
            .filter_eq(STORAGES.col("HouseholdIdentifier"), household)
            .order_by(STORAGES.col("SortOrder"))
            .into()
    }
}

fn joined() -> Select {
    Select::from(STORAGES.aliased())
        .columns(STORAGES.qualified_refs())
        .column(STORAGE_TYPES.col("SortOrder").as_name("StorageTypeSortOrder"))
        .column(STORAGE_TYPES.col("Temperature").as_name("StorageTypeTemperature"))
        .column(STORAGE_TYPES.col("TemperatureRangeStartValue"))
        .column(STORAGE_TYPES.col("TemperatureRangeEndValue"))
        .column(STORAGE_TYPES.col("Creatable"))
        .column(STORAGE_TYPES.col("Editable"))
        .column(STORAGE_TYPES.col("Deletable"))
        .inner_join(
            STORAGE_TYPES.aliased(),
            STORAGE_TYPES.col("StorageTypeIdentifier"),
            STORAGES.col("StorageTypeIdentifier"),
        )
}

impl DataProxy for StorageProxy {
    const NAME: &'static str = "StorageProxy";
    const SCHEMA: TableSchema = STORAGES;

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
            key_value(self.household_identifier, "Household.Identifier")?,
            SqlValue::from(self.sort_order),
            key_value(self.storage_type.identifier(), "StorageType.Identifier")?,
            SqlValue::from_option(self.description.clone()),
            SqlValue::from(self.temperature),
            SqlValue::from(self.creation_time),
        ])
    }

    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()> {
        self.identifier = Some(row.id("StorageIdentifier")?);
        self.household_identifier = Some(row.id("HouseholdIdentifier")?);
        self.sort_order = row.i32("SortOrder")?;
        self.storage_type = if row.row().contains("StorageTypeSortOrder") {
            hydrate(row.row(), JOINED_TYPE_COLUMNS)?
        } else {
            StorageTypeProxy::keyed(row.id("StorageTypeIdentifier")?)
        };
        self.description = row.opt_text("Descr")?;
        self.temperature = row.i32("Temperature")?;
        self.creation_time = row.timestamp("CreationTime")?;
        Ok(())
    }

    fn build_select(&self) -> CoreResult<Statement> {
        Ok(joined()
            .filter_eq(STORAGES.col("StorageIdentifier"), self.unique_id()?)
            .into())
    }

    fn load_relations(&mut self, _id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        let key = self.storage_type.unique_id()?;
        if let Some(storage_type) = load_one(accessor, &builder::select_by_key(&STORAGE_TYPES, &key))? {
            self.storage_type = storage_type;
        }
        Ok(())
    }
}

impl OwnedChild for StorageProxy {
    fn set_owner(&mut self, owner: ProxyId) {
        self.household_identifier = Some(owner);
    }

    fn check(&self) -> CoreResult<()> {
        key_value(self.storage_type.identifier(), "StorageType.Identifier").map(drop)
    }
}

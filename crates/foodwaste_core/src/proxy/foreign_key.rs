use super::{key_value, DataProviderProxy, DataProxy, RowView};
use crate::builder;
use crate::error::CoreResult;
use crate::identity::ProxyId;
use crate::load::load_one;
use crate::schema::{TableSchema, DATA_PROVIDERS, FOREIGN_KEYS};
use crate::state::HydrationState;
use crate::sync::OwnedChild;
use foodwaste_sql::{Select, SqlValue, Statement};
use foodwaste_store::DataAccessor;

/// Separator between type names in `ForeignKeyForTypes`.
const TYPE_SEPARATOR: char = ';';

/// The key a data provider uses for one of our objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForeignKeyProxy {
    identifier: Option<ProxyId>,
    /// Provider owning the key.
    pub data_provider: DataProviderProxy,
    /// Identifier of the object the key is for.
    pub foreign_key_for_identifier: Option<ProxyId>,
    /// Type names of the object the key is for.
    pub foreign_key_for_types: Vec<String>,
    /// The provider's key.
    pub foreign_key_value: String,
    state: HydrationState,
}

impl ForeignKeyProxy {
    /// Creates a foreign key. The identifier is assigned on save if absent.
    pub fn new(
        identifier: Option<ProxyId>,
        data_provider: DataProviderProxy,
        foreign_key_for_identifier: Option<ProxyId>,
        foreign_key_for_types: &[&str],
        foreign_key_value: impl Into<String>,
    ) -> Self {
        Self {
            identifier,
            data_provider,
            foreign_key_for_identifier,
            foreign_key_for_types: foreign_key_for_types.iter().map(|t| (*t).to_string()).collect(),
            foreign_key_value: foreign_key_value.into(),
            state: HydrationState::RelationsLoaded,
        }
    }

    /// Selects the foreign keys of `owner`, ordered by provider name.
    #[must_use]
    pub fn select_for(owner: &str) -> Statement {
        joined()
            .filter_eq(FOREIGN_KEYS.col("ForeignKeyForIdentifier"), owner)
            .order_by(DATA_PROVIDERS.col("Name"))
            .into()
    }
}

fn joined() -> Select {
    Select::from(FOREIGN_KEYS.aliased())
        .columns(FOREIGN_KEYS.qualified_refs())
        .column(DATA_PROVIDERS.col("Name"))
        .column(DATA_PROVIDERS.col("HandlesPayments"))
        .column(DATA_PROVIDERS.col("DataSourceStatementIdentifier"))
        .inner_join(
            DATA_PROVIDERS.aliased(),
            DATA_PROVIDERS.col("DataProviderIdentifier"),
            FOREIGN_KEYS.col("DataProviderIdentifier"),
        )
}

impl DataProxy for ForeignKeyProxy {
    const NAME: &'static str = "ForeignKeyProxy";
    const SCHEMA: TableSchema = FOREIGN_KEYS;

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
            key_value(self.data_provider.identifier(), "DataProvider.Identifier")?,
            key_value(self.foreign_key_for_identifier, "ForeignKeyForIdentifier")?,
            SqlValue::text(self.foreign_key_for_types.join(&TYPE_SEPARATOR.to_string())),
            SqlValue::text(&self.foreign_key_value),
        ])
    }

    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()> {
        self.identifier = Some(row.id("ForeignKeyIdentifier")?);
        self.data_provider = if row.row().contains("Name") {
            super::hydrate(row.row(), &[])?
        } else {
            DataProviderProxy::keyed(row.id("DataProviderIdentifier")?)
        };
        self.foreign_key_for_identifier = Some(row.id("ForeignKeyForIdentifier")?);
        self.foreign_key_for_types = row
            .text("ForeignKeyForTypes")?
            .split(TYPE_SEPARATOR)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        self.foreign_key_value = row.text("ForeignKeyValue")?;
        Ok(())
    }

    fn build_select(&self) -> CoreResult<Statement> {
        Ok(joined()
            .filter_eq(FOREIGN_KEYS.col("ForeignKeyIdentifier"), self.unique_id()?)
            .into())
    }

    fn load_relations(&mut self, _id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        let key = self.data_provider.unique_id()?;
        if let Some(provider) = load_one(accessor, &builder::select_by_key(&DATA_PROVIDERS, &key))? {
            self.data_provider = provider;
        }
        Ok(())
    }
}

impl OwnedChild for ForeignKeyProxy {
    fn set_owner(&mut self, owner: ProxyId) {
        self.foreign_key_for_identifier = Some(owner);
    }

    fn check(&self) -> CoreResult<()> {
        key_value(self.data_provider.identifier(), "DataProvider.Identifier").map(drop)
    }
}

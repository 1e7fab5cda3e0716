use super::{key_value, DataProxy, RowView, TranslationProxy};
use crate::builder;
use crate::error::CoreResult;
use crate::identity::{format_key, require_id, ProxyId};
use crate::load::load_all;
use crate::schema::{TableSchema, DATA_PROVIDERS};
use crate::state::HydrationState;
use crate::sync::{delete_all, sync_children, validate_children};
use foodwaste_sql::{ColumnRef, SqlValue, Statement};
use foodwaste_store::DataAccessor;

/// A source of food data, with translated data source statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataProviderProxy {
    identifier: Option<ProxyId>,
    /// Provider name.
    pub name: String,
    /// Whether the provider handles payments.
    pub handles_payments: bool,
    /// Identifier the data source statement translations belong to.
    pub data_source_statement_identifier: Option<ProxyId>,
    /// Translations of the data source statement.
    pub data_source_statements: Vec<TranslationProxy>,
    state: HydrationState,
}

impl DataProviderProxy {
    /// Creates a data provider.
    pub fn new(
        identifier: ProxyId,
        name: impl Into<String>,
        handles_payments: bool,
        data_source_statement_identifier: ProxyId,
    ) -> Self {
        Self {
            identifier: Some(identifier),
            name: name.into(),
            handles_payments,
            data_source_statement_identifier: Some(data_source_statement_identifier),
            data_source_statements: Vec::new(),
            state: HydrationState::RelationsLoaded,
        }
    }

    /// Selects every provider, ordered by name.
    #[must_use]
    pub fn select_all() -> Statement {
        builder::select_all(&DATA_PROVIDERS)
            .order_by(ColumnRef::new("Name"))
            .into()
    }

    fn statements_query(&self) -> CoreResult<Statement> {
        let of = format_key(
            self.data_source_statement_identifier,
            "DataSourceStatementIdentifier",
        )?;
        Ok(TranslationProxy::select_for(&of))
    }
}

impl DataProxy for DataProviderProxy {
    const NAME: &'static str = "DataProviderProxy";
    const SCHEMA: TableSchema = DATA_PROVIDERS;

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
            SqlValue::text(&self.name),
            SqlValue::Bool(self.handles_payments),
            key_value(
                self.data_source_statement_identifier,
                "DataSourceStatementIdentifier",
            )?,
        ])
    }

    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()> {
        self.identifier = Some(row.id("DataProviderIdentifier")?);
        self.name = row.text("Name")?;
        self.handles_payments = row.bool("HandlesPayments")?;
        self.data_source_statement_identifier = Some(row.id("DataSourceStatementIdentifier")?);
        Ok(())
    }

    fn load_relations(&mut self, _id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        self.data_source_statements = load_all(accessor, &self.statements_query()?)?;
        Ok(())
    }

    fn holds_relations(&self) -> bool {
        !self.data_source_statements.is_empty()
    }

    fn validate_relations(&self) -> CoreResult<()> {
        format_key(
            self.data_source_statement_identifier,
            "DataSourceStatementIdentifier",
        )?;
        validate_children(&self.data_source_statements, "DataSourceStatements")
    }

    fn store_relations(&mut self, _id: ProxyId, accessor: &dyn DataAccessor, _is_new: bool) -> CoreResult<()> {
        let query = self.statements_query()?;
        let owner = require_id(
            self.data_source_statement_identifier,
            "DataSourceStatementIdentifier",
        )?;
        sync_children(owner, &mut self.data_source_statements, &query, accessor)?;
        Ok(())
    }

    fn remove_relations(&mut self, _id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        delete_all::<TranslationProxy>(&self.statements_query()?, accessor)?;
        Ok(())
    }
}

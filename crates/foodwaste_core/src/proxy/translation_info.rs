use super::{DataProxy, RowView};
use crate::builder;
use crate::error::CoreResult;
use crate::identity::ProxyId;
use crate::schema::{TableSchema, TRANSLATION_INFOS};
use crate::state::HydrationState;
use foodwaste_sql::{ColumnRef, SqlValue, Statement};

/// A culture translations can be written in, e.g. `da-DK`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationInfoProxy {
    identifier: Option<ProxyId>,
    /// Culture name.
    pub culture_name: String,
    state: HydrationState,
}

impl TranslationInfoProxy {
    /// Creates a translation info.
    pub fn new(identifier: ProxyId, culture_name: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier),
            culture_name: culture_name.into(),
            state: HydrationState::RelationsLoaded,
        }
    }

    /// Selects every culture, ordered by name.
    #[must_use]
    pub fn select_all() -> Statement {
        builder::select_all(&TRANSLATION_INFOS)
            .order_by(ColumnRef::new("CultureName"))
            .into()
    }
}

impl DataProxy for TranslationInfoProxy {
    const NAME: &'static str = "TranslationInfoProxy";
    const SCHEMA: TableSchema = TRANSLATION_INFOS;

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
            SqlValue::text(&self.culture_name),
        ])
    }

    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()> {
        self.identifier = Some(row.id("TranslationInfoIdentifier")?);
        self.culture_name = row.text("CultureName")?;
        Ok(())
    }
}

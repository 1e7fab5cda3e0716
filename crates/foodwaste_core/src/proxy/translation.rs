use super::{key_value, DataProxy, RowView, TranslationInfoProxy};
use crate::error::CoreResult;
use crate::identity::ProxyId;
use crate::schema::{TableSchema, TRANSLATIONS, TRANSLATION_INFOS};
use crate::state::HydrationState;
use crate::sync::OwnedChild;
use foodwaste_sql::{Select, SqlValue, Statement};

/// A text in one culture, belonging to the object `of_identifier` names.
///
/// Rows are read joined with their culture, so a loaded translation carries
/// its [`TranslationInfoProxy`] without a second query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationProxy {
    identifier: Option<ProxyId>,
    /// Identifier of the translated object.
    pub of_identifier: Option<ProxyId>,
    /// Culture of the text.
    pub translation_info: TranslationInfoProxy,
    /// The text.
    pub value: String,
    state: HydrationState,
}

impl TranslationProxy {
    /// Creates a translation. The identifier is assigned on save if absent.
    pub fn new(
        identifier: Option<ProxyId>,
        of_identifier: Option<ProxyId>,
        translation_info: TranslationInfoProxy,
        value: impl Into<String>,
    ) -> Self {
        Self {
            identifier,
            of_identifier,
            translation_info,
            value: value.into(),
            state: HydrationState::RelationsLoaded,
        }
    }

    /// Culture name of the text.
    #[must_use]
    pub fn culture_name(&self) -> &str {
        &self.translation_info.culture_name
    }

    /// Selects the translations of `of`, ordered by culture.
    #[must_use]
    pub fn select_for(of: &str) -> Statement {
        joined()
            .filter_eq(TRANSLATIONS.col("OfIdentifier"), of)
            .order_by(TRANSLATION_INFOS.col("CultureName"))
            .into()
    }
}

fn joined() -> Select {
    Select::from(TRANSLATIONS.aliased())
        .columns(TRANSLATIONS.qualified_refs())
        .column(TRANSLATION_INFOS.col("CultureName"))
        .inner_join(
            TRANSLATION_INFOS.aliased(),
            TRANSLATION_INFOS.col("TranslationInfoIdentifier"),
            TRANSLATIONS.col("InfoIdentifier"),
        )
}

impl DataProxy for TranslationProxy {
    const NAME: &'static str = "TranslationProxy";
    const SCHEMA: TableSchema = TRANSLATIONS;

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
            key_value(self.of_identifier, "OfIdentifier")?,
            key_value(
                self.translation_info.identifier(),
                "TranslationInfo.Identifier",
            )?,
            SqlValue::text(&self.value),
        ])
    }

    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()> {
        self.identifier = Some(row.id("TranslationIdentifier")?);
        self.of_identifier = Some(row.id("OfIdentifier")?);
        self.translation_info = TranslationInfoProxy::keyed(row.id("InfoIdentifier")?);
        if row.row().contains("CultureName") {
            self.translation_info.culture_name = row.row().text("CultureName")?;
            self.translation_info.set_state(HydrationState::ScalarsLoaded);
        }
        self.value = row.text("Value")?;
        Ok(())
    }

    fn build_select(&self) -> CoreResult<Statement> {
        Ok(joined()
            .filter_eq(TRANSLATIONS.col("TranslationIdentifier"), self.unique_id()?)
            .into())
    }
}

impl OwnedChild for TranslationProxy {
    fn set_owner(&mut self, owner: ProxyId) {
        self.of_identifier = Some(owner);
    }

    fn check(&self) -> CoreResult<()> {
        key_value(
            self.translation_info.identifier(),
            "TranslationInfo.Identifier",
        )
        .map(drop)
    }
}

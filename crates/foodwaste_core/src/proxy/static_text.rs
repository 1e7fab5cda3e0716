use super::{key_value, opt_key_value, Capability, DataProxy, RowView, TranslationProxy};
use crate::builder;
use crate::error::CoreResult;
use crate::identity::ProxyId;
use crate::load::load_all;
use crate::schema::{TableSchema, STATIC_TEXTS};
use crate::state::HydrationState;
use foodwaste_sql::{ColumnRef, SqlValue, Statement};
use foodwaste_store::DataAccessor;

/// A system text with a translated subject and an optional translated body.
///
/// Static texts are reference data: they are read through the engine but
/// their relations are never written or deleted by it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticTextProxy {
    identifier: Option<ProxyId>,
    /// Kind of text.
    pub static_text_type: i32,
    /// Identifier the subject translations belong to.
    pub subject_translation_identifier: Option<ProxyId>,
    /// Identifier the body translations belong to.
    pub body_translation_identifier: Option<ProxyId>,
    /// Subject in every culture.
    pub subject_translations: Vec<TranslationProxy>,
    /// Body in every culture.
    pub body_translations: Vec<TranslationProxy>,
    state: HydrationState,
}

impl StaticTextProxy {
    /// Creates a static text.
    pub fn new(
        identifier: ProxyId,
        static_text_type: i32,
        subject_translation_identifier: ProxyId,
        body_translation_identifier: Option<ProxyId>,
    ) -> Self {
        Self {
            identifier: Some(identifier),
            static_text_type,
            subject_translation_identifier: Some(subject_translation_identifier),
            body_translation_identifier,
            state: HydrationState::RelationsLoaded,
            ..Self::default()
        }
    }

    /// Selects the text of the given type.
    #[must_use]
    pub fn select_by_type(static_text_type: i32) -> Statement {
        builder::select_all(&STATIC_TEXTS)
            .filter_eq(ColumnRef::new("StaticTextType"), static_text_type)
            .into()
    }
}

impl DataProxy for StaticTextProxy {
    const NAME: &'static str = "StaticTextProxy";
    const SCHEMA: TableSchema = STATIC_TEXTS;
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
            SqlValue::from(self.static_text_type),
            key_value(
                self.subject_translation_identifier,
                "SubjectTranslationIdentifier",
            )?,
            opt_key_value(self.body_translation_identifier),
        ])
    }

    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()> {
        self.identifier = Some(row.id("StaticTextIdentifier")?);
        self.static_text_type = row.i32("StaticTextType")?;
        self.subject_translation_identifier = Some(row.id("SubjectTranslationIdentifier")?);
        self.body_translation_identifier = row.opt_id("BodyTranslationIdentifier")?;
        Ok(())
    }

    fn load_relations(&mut self, _id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        self.subject_translations = match self.subject_translation_identifier {
            Some(subject) => load_all(accessor, &TranslationProxy::select_for(&subject.to_key()))?,
            None => Vec::new(),
        };
        self.body_translations = match self.body_translation_identifier {
            Some(body) => load_all(accessor, &TranslationProxy::select_for(&body.to_key()))?,
            None => Vec::new(),
        };
        Ok(())
    }
}

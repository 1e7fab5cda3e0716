use super::{opt_key_value, DataProxy, FoodItemGroupProxy, ForeignKeyProxy, RowView, TranslationProxy};
use crate::builder;
use crate::error::{CoreError, CoreResult};
use crate::identity::ProxyId;
use crate::load::{load_all, load_one};
use crate::schema::{TableSchema, FOOD_GROUPS};
use crate::state::HydrationState;
use crate::sync::{delete_all, sync_children, validate_children};
use foodwaste_sql::{ColumnRef, SqlValue, Statement};
use foodwaste_store::DataAccessor;

/// A node in the food group hierarchy.
///
/// The parent is held by value as a lookup result, not as a shared node:
/// loading a group loads its parent's columns but never the parent's own
/// relations. Children are loaded one level deep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoodGroupProxy {
    identifier: Option<ProxyId>,
    /// Identifier of the parent group; `None` for a root group.
    pub parent_identifier: Option<ProxyId>,
    /// The parent group, once loaded.
    pub parent: Option<Box<FoodGroupProxy>>,
    /// Whether the group is active.
    pub is_active: bool,
    /// Direct child groups.
    pub children: Vec<FoodGroupProxy>,
    /// Translated names.
    pub translations: Vec<TranslationProxy>,
    /// Keys at data providers.
    pub foreign_keys: Vec<ForeignKeyProxy>,
    state: HydrationState,
}

impl FoodGroupProxy {
    /// Creates a food group.
    pub fn new(identifier: ProxyId, parent: Option<&FoodGroupProxy>, is_active: bool) -> Self {
        let mut group = Self {
            identifier: Some(identifier),
            is_active,
            state: HydrationState::RelationsLoaded,
            ..Self::default()
        };
        group.set_parent(parent.cloned());
        group
    }

    /// Replaces the parent group.
    pub fn set_parent(&mut self, parent: Option<FoodGroupProxy>) {
        self.parent_identifier = parent.as_ref().and_then(|p| p.identifier());
        self.parent = parent.map(Box::new);
    }

    /// Whether the group has no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_identifier.is_none()
    }

    /// Selects the groups without a parent.
    #[must_use]
    pub fn select_roots() -> Statement {
        builder::select_all(&FOOD_GROUPS)
            .filter_null(ColumnRef::new("ParentIdentifier"))
            .into()
    }

    /// Selects the direct children of `parent`.
    #[must_use]
    pub fn select_children(parent: &str) -> Statement {
        builder::select_where(&FOOD_GROUPS, "ParentIdentifier", parent).into()
    }

    /// Selects every group.
    #[must_use]
    pub fn select_all() -> Statement {
        builder::select_all(&FOOD_GROUPS).into()
    }
}

impl DataProxy for FoodGroupProxy {
    const NAME: &'static str = "FoodGroupProxy";
    const SCHEMA: TableSchema = FOOD_GROUPS;

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
            opt_key_value(self.parent_identifier),
            SqlValue::Bool(self.is_active),
        ])
    }

    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()> {
        self.identifier = Some(row.id("FoodGroupIdentifier")?);
        self.parent_identifier = row.opt_id("ParentIdentifier")?;
        self.is_active = row.bool("IsActive")?;
        Ok(())
    }

    fn load_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        let key = id.to_key();
        self.parent = match self.parent_identifier {
            Some(parent) => load_one::<FoodGroupProxy>(
                accessor,
                &builder::select_by_key(&FOOD_GROUPS, &parent.to_key()),
            )?
            .map(Box::new),
            None => None,
        };
        self.children = load_all(accessor, &Self::select_children(&key))?;
        self.translations = load_all(accessor, &TranslationProxy::select_for(&key))?;
        self.foreign_keys = load_all(accessor, &ForeignKeyProxy::select_for(&key))?;
        Ok(())
    }

    fn holds_relations(&self) -> bool {
        !self.translations.is_empty() || !self.foreign_keys.is_empty()
    }

    fn validate_relations(&self) -> CoreResult<()> {
        if let Some(parent) = &self.parent {
            if parent.identifier().is_none() {
                return Err(CoreError::illegal_value("Parent.Identifier"));
            }
        }
        validate_children(&self.translations, "Translations")?;
        validate_children(&self.foreign_keys, "ForeignKeys")
    }

    fn store_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor, _is_new: bool) -> CoreResult<()> {
        let key = id.to_key();
        sync_children(id, &mut self.translations, &TranslationProxy::select_for(&key), accessor)?;
        sync_children(id, &mut self.foreign_keys, &ForeignKeyProxy::select_for(&key), accessor)?;
        Ok(())
    }

    fn remove_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        let key = id.to_key();
        delete_all::<FoodGroupProxy>(&Self::select_children(&key), accessor)?;
        delete_all::<FoodItemGroupProxy>(&FoodItemGroupProxy::select_for_group(&key), accessor)?;
        delete_all::<TranslationProxy>(&TranslationProxy::select_for(&key), accessor)?;
        delete_all::<ForeignKeyProxy>(&ForeignKeyProxy::select_for(&key), accessor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_sets_parent_identifier() {
        let root = FoodGroupProxy::new(ProxyId::new(), None, true);
        let child = FoodGroupProxy::new(ProxyId::new(), Some(&root), true);
        assert!(root.is_root());
        assert_eq!(child.parent_identifier, root.identifier());
        assert_eq!(child.column_values().unwrap()[1], SqlValue::from(root.identifier().unwrap()));
    }

    #[test]
    fn root_has_null_parent() {
        let root = FoodGroupProxy::new(ProxyId::new(), None, false);
        let values = root.column_values().unwrap();
        assert_eq!(values[1], SqlValue::Null);
        assert_eq!(values[2], SqlValue::Bool(false));
    }

    #[test]
    fn select_roots_text() {
        assert_eq!(
            FoodGroupProxy::select_roots().to_string(),
            "SELECT FoodGroupIdentifier,ParentIdentifier,IsActive FROM FoodGroups WHERE ParentIdentifier IS NULL"
        );
    }
}

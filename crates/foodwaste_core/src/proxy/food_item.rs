use super::{DataProxy, FoodGroupProxy, FoodItemGroupProxy, ForeignKeyProxy, RowView, TranslationProxy};
use crate::builder;
use crate::error::{CoreError, CoreResult};
use crate::identity::ProxyId;
use crate::load::load_all;
use crate::schema::{TableSchema, FOOD_ITEMS, FOOD_ITEM_GROUPS};
use crate::state::HydrationState;
use crate::sync::{delete_all, reconcile, sync_children, validate_children, Association, Link};
use foodwaste_sql::{Select, SqlValue, Statement};
use foodwaste_store::DataAccessor;

/// A food item and the groups it belongs to.
///
/// `food_groups` lists every group of the item, the primary one included.
/// When saved, the stored memberships become exactly `food_groups` plus the
/// primary group, with the primary flag set on the primary group only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoodItemProxy {
    identifier: Option<ProxyId>,
    /// Whether the item is active.
    pub is_active: bool,
    /// The item's primary group.
    pub primary_food_group: Option<FoodGroupProxy>,
    /// Every group of the item.
    pub food_groups: Vec<FoodGroupProxy>,
    /// Translated names.
    pub translations: Vec<TranslationProxy>,
    /// Keys at data providers.
    pub foreign_keys: Vec<ForeignKeyProxy>,
    state: HydrationState,
}

impl FoodItemProxy {
    /// Creates a food item in `primary_food_group`.
    pub fn new(identifier: ProxyId, primary_food_group: Option<FoodGroupProxy>, is_active: bool) -> Self {
        let mut item = Self {
            identifier: Some(identifier),
            is_active,
            state: HydrationState::RelationsLoaded,
            ..Self::default()
        };
        if let Some(group) = primary_food_group {
            item.set_primary_food_group(group);
        }
        item
    }

    /// Makes `group` the primary group, adding it to the item's groups.
    pub fn set_primary_food_group(&mut self, group: FoodGroupProxy) {
        self.add_food_group(group.clone());
        self.primary_food_group = Some(group);
    }

    /// Adds `group` unless a group with its identifier is already present.
    pub fn add_food_group(&mut self, group: FoodGroupProxy) {
        let present = group.identifier().is_some()
            && self.food_groups.iter().any(|g| g.identifier() == group.identifier());
        if !present {
            self.food_groups.push(group);
        }
    }

    /// Removes the group with identifier `id`. Removing the primary group
    /// leaves the item without one.
    pub fn remove_food_group(&mut self, id: ProxyId) {
        self.food_groups.retain(|g| g.identifier() != Some(id));
        if self
            .primary_food_group
            .as_ref()
            .is_some_and(|g| g.identifier() == Some(id))
        {
            self.primary_food_group = None;
        }
    }

    /// Selects every food item.
    #[must_use]
    pub fn select_all() -> Statement {
        builder::select_all(&FOOD_ITEMS).into()
    }

    /// Selects the food items that belong to `food_group`.
    #[must_use]
    pub fn select_for_group(food_group: &str) -> Statement {
        Select::from(FOOD_ITEMS.aliased())
            .columns(FOOD_ITEMS.qualified_refs())
            .inner_join(
                FOOD_ITEM_GROUPS.aliased(),
                FOOD_ITEM_GROUPS.col("FoodItemIdentifier"),
                FOOD_ITEMS.col("FoodItemIdentifier"),
            )
            .filter_eq(FOOD_ITEM_GROUPS.col("FoodGroupIdentifier"), food_group)
            .into()
    }

    fn desired_groups(&self) -> Vec<Link<bool>> {
        let primary = self.primary_food_group.as_ref().and_then(|g| g.identifier());
        let mut links: Vec<Link<bool>> = primary.map(|p| Link::new(p, true)).into_iter().collect();
        links.extend(
            self.food_groups
                .iter()
                .filter_map(|g| g.identifier())
                .filter(|id| Some(*id) != primary)
                .map(|id| Link::new(id, false)),
        );
        links
    }
}

fn memberships(food_item: &str) -> Association<FoodItemGroupProxy> {
    Association {
        name: "FoodItemGroups",
        existing: FoodItemGroupProxy::select_rows_for_item(food_item),
        target_of: |row| row.food_group_identifier,
        link: |item, group, is_primary| FoodItemGroupProxy::new(None, item, group, is_primary),
    }
}

impl DataProxy for FoodItemProxy {
    const NAME: &'static str = "FoodItemProxy";
    const SCHEMA: TableSchema = FOOD_ITEMS;

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
            SqlValue::Bool(self.is_active),
        ])
    }

    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()> {
        self.identifier = Some(row.id("FoodItemIdentifier")?);
        self.is_active = row.bool("IsActive")?;
        Ok(())
    }

    fn load_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        let key = id.to_key();
        let rows: Vec<FoodItemGroupProxy> =
            load_all(accessor, &FoodItemGroupProxy::select_for_item(&key))?;
        self.primary_food_group = rows
            .iter()
            .find(|row| row.is_primary)
            .and_then(|row| row.food_group.clone());
        self.food_groups = rows.into_iter().filter_map(|row| row.food_group).collect();
        self.translations = load_all(accessor, &TranslationProxy::select_for(&key))?;
        self.foreign_keys = load_all(accessor, &ForeignKeyProxy::select_for(&key))?;
        Ok(())
    }

    fn holds_relations(&self) -> bool {
        self.primary_food_group.is_some()
            || !self.food_groups.is_empty()
            || !self.translations.is_empty()
            || !self.foreign_keys.is_empty()
    }

    fn validate_relations(&self) -> CoreResult<()> {
        if let Some(primary) = &self.primary_food_group {
            if primary.identifier().is_none() {
                return Err(CoreError::illegal_value("PrimaryFoodGroup.Identifier"));
            }
        }
        if self.food_groups.iter().any(|g| g.identifier().is_none()) {
            return Err(CoreError::illegal_value("FoodGroups[].Identifier"));
        }
        validate_children(&self.translations, "Translations")?;
        validate_children(&self.foreign_keys, "ForeignKeys")
    }

    fn store_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor, _is_new: bool) -> CoreResult<()> {
        let key = id.to_key();
        reconcile(id, self.desired_groups(), &memberships(&key), accessor)?;
        sync_children(id, &mut self.translations, &TranslationProxy::select_for(&key), accessor)?;
        sync_children(id, &mut self.foreign_keys, &ForeignKeyProxy::select_for(&key), accessor)?;
        Ok(())
    }

    fn remove_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        let key = id.to_key();
        delete_all::<FoodItemGroupProxy>(&FoodItemGroupProxy::select_rows_for_item(&key), accessor)?;
        delete_all::<TranslationProxy>(&TranslationProxy::select_for(&key), accessor)?;
        delete_all::<ForeignKeyProxy>(&ForeignKeyProxy::select_for(&key), accessor)?;
        Ok(())
    }
}

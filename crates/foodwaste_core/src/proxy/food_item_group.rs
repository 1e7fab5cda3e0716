use super::{hydrate, key_value, DataProxy, FoodGroupProxy, FoodItemProxy, RowView};
use crate::builder;
use crate::error::CoreResult;
use crate::identity::ProxyId;
use crate::load::load_one;
use crate::schema::{TableSchema, FOOD_GROUPS, FOOD_ITEMS, FOOD_ITEM_GROUPS};
use crate::state::HydrationState;
use crate::sync::AssociationRow;
use foodwaste_sql::{SqlValue, Statement};
use foodwaste_store::DataAccessor;

/// Membership of a food item in a food group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoodItemGroupProxy {
    identifier: Option<ProxyId>,
    /// Identifier of the food item.
    pub food_item_identifier: Option<ProxyId>,
    /// Identifier of the food group.
    pub food_group_identifier: Option<ProxyId>,
    /// The food item, once loaded.
    pub food_item: Option<Box<FoodItemProxy>>,
    /// The food group, once loaded.
    pub food_group: Option<FoodGroupProxy>,
    /// Whether this is the item's primary group.
    pub is_primary: bool,
    state: HydrationState,
}

impl FoodItemGroupProxy {
    /// Creates a membership. The identifier is assigned on insert if absent.
    pub fn new(identifier: Option<ProxyId>, food_item: ProxyId, food_group: ProxyId, is_primary: bool) -> Self {
        Self {
            identifier,
            food_item_identifier: Some(food_item),
            food_group_identifier: Some(food_group),
            is_primary,
            state: HydrationState::RelationsLoaded,
            ..Self::default()
        }
    }

    /// Selects the memberships of a food item joined with their groups.
    #[must_use]
    pub fn select_for_item(food_item: &str) -> Statement {
        foodwaste_sql::Select::from(FOOD_ITEM_GROUPS.aliased())
            .columns(FOOD_ITEM_GROUPS.qualified_refs())
            .column(FOOD_GROUPS.col("ParentIdentifier"))
            .column(FOOD_GROUPS.col("IsActive"))
            .inner_join(
                FOOD_GROUPS.aliased(),
                FOOD_GROUPS.col("FoodGroupIdentifier"),
                FOOD_ITEM_GROUPS.col("FoodGroupIdentifier"),
            )
            .filter_eq(FOOD_ITEM_GROUPS.col("FoodItemIdentifier"), food_item)
            .into()
    }

    /// Selects the stored membership rows of a food item.
    #[must_use]
    pub fn select_rows_for_item(food_item: &str) -> Statement {
        builder::select_where(&FOOD_ITEM_GROUPS, "FoodItemIdentifier", food_item).into()
    }

    /// Selects the stored membership rows of a food group.
    #[must_use]
    pub fn select_for_group(food_group: &str) -> Statement {
        builder::select_where(&FOOD_ITEM_GROUPS, "FoodGroupIdentifier", food_group).into()
    }
}

impl DataProxy for FoodItemGroupProxy {
    const NAME: &'static str = "FoodItemGroupProxy";
    const SCHEMA: TableSchema = FOOD_ITEM_GROUPS;

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
            key_value(self.food_item_identifier, "FoodItemIdentifier")?,
            key_value(self.food_group_identifier, "FoodGroupIdentifier")?,
            SqlValue::Bool(self.is_primary),
        ])
    }

    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()> {
        self.identifier = Some(row.id("FoodItemGroupIdentifier")?);
        self.food_item_identifier = Some(row.id("FoodItemIdentifier")?);
        self.food_group_identifier = Some(row.id("FoodGroupIdentifier")?);
        self.is_primary = row.bool("IsPrimary")?;
        if row.row().contains("IsActive") {
            self.food_group = Some(hydrate(row.row(), &[])?);
        }
        Ok(())
    }

    fn load_relations(&mut self, _id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        if let Some(item) = self.food_item_identifier {
            self.food_item = load_one::<FoodItemProxy>(
                accessor,
                &builder::select_by_key(&FOOD_ITEMS, &item.to_key()),
            )?
            .map(Box::new);
        }
        if let Some(group) = self.food_group_identifier {
            self.food_group = load_one(accessor, &builder::select_by_key(&FOOD_GROUPS, &group.to_key()))?;
        }
        Ok(())
    }
}

impl AssociationRow for FoodItemGroupProxy {
    type Payload = bool;

    fn payload(&self) -> bool {
        self.is_primary
    }

    fn set_payload(&mut self, payload: bool) {
        self.is_primary = payload;
    }
}

use super::{now, truncate, DataProxy, HouseholdMemberProxy, MemberOfHouseholdProxy, RowView, StorageProxy};
use crate::builder;
use crate::error::{CoreError, CoreResult};
use crate::identity::ProxyId;
use crate::load::load_all;
use crate::schema::{TableSchema, HOUSEHOLDS};
use crate::state::HydrationState;
use crate::sync::{delete_all, reconcile, sync_children, validate_children, Association, Link};
use chrono::{DateTime, Utc};
use foodwaste_sql::{ColumnRef, SqlValue, Statement};
use foodwaste_store::DataAccessor;

/// A household with its members and storages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HouseholdProxy {
    identifier: Option<ProxyId>,
    /// Household name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Creation time, second precision.
    pub creation_time: DateTime<Utc>,
    /// Members of the household.
    pub household_members: Vec<HouseholdMemberProxy>,
    /// Storages of the household.
    pub storages: Vec<StorageProxy>,
    state: HydrationState,
}

impl HouseholdProxy {
    /// Creates a household.
    pub fn new(
        identifier: ProxyId,
        name: impl Into<String>,
        description: Option<String>,
        creation_time: DateTime<Utc>,
    ) -> Self {
        Self {
            identifier: Some(identifier),
            name: name.into(),
            description,
            creation_time: truncate(creation_time),
            household_members: Vec::new(),
            storages: Vec::new(),
            state: HydrationState::RelationsLoaded,
        }
    }

    /// Selects every household, ordered by name.
    #[must_use]
    pub fn select_all() -> Statement {
        builder::select_all(&HOUSEHOLDS)
            .order_by(ColumnRef::new("Name"))
            .into()
    }
}

fn memberships(household: &str) -> Association<MemberOfHouseholdProxy> {
    Association {
        name: "MemberOfHouseholds",
        existing: MemberOfHouseholdProxy::select_rows_for_household(household),
        target_of: |row| row.household_member_identifier,
        link: |household, member, ()| MemberOfHouseholdProxy::new(None, member, household, now()),
    }
}

impl DataProxy for HouseholdProxy {
    const NAME: &'static str = "HouseholdProxy";
    const SCHEMA: TableSchema = HOUSEHOLDS;

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
            SqlValue::from_option(self.description.clone()),
            SqlValue::from(self.creation_time),
        ])
    }

    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()> {
        self.identifier = Some(row.id("HouseholdIdentifier")?);
        self.name = row.text("Name")?;
        self.description = row.opt_text("Descr")?;
        self.creation_time = row.timestamp("CreationTime")?;
        Ok(())
    }

    fn load_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        let key = id.to_key();
        let rows: Vec<MemberOfHouseholdProxy> =
            load_all(accessor, &MemberOfHouseholdProxy::select_for_household(&key))?;
        self.household_members = rows.into_iter().filter_map(|row| row.household_member).collect();
        self.storages = load_all(accessor, &StorageProxy::select_for_household(&key))?;
        Ok(())
    }

    fn holds_relations(&self) -> bool {
        !self.household_members.is_empty() || !self.storages.is_empty()
    }

    fn validate_relations(&self) -> CoreResult<()> {
        if self.household_members.iter().any(|m| m.identifier().is_none()) {
            return Err(CoreError::illegal_value("HouseholdMembers[].Identifier"));
        }
        validate_children(&self.storages, "Storages")
    }

    fn store_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor, _is_new: bool) -> CoreResult<()> {
        let key = id.to_key();
        let desired = self
            .household_members
            .iter()
            .filter_map(|m| m.identifier())
            .map(|member| Link::new(member, ()))
            .collect();
        reconcile(id, desired, &memberships(&key), accessor)?;
        sync_children(id, &mut self.storages, &StorageProxy::select_for_household(&key), accessor)?;
        Ok(())
    }

    fn remove_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        let key = id.to_key();
        delete_all::<MemberOfHouseholdProxy>(&MemberOfHouseholdProxy::select_rows_for_household(&key), accessor)?;
        delete_all::<StorageProxy>(&StorageProxy::select_for_household(&key), accessor)?;
        Ok(())
    }
}

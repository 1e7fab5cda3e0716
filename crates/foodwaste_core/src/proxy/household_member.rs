use super::{now, truncate, DataProxy, HouseholdProxy, MemberOfHouseholdProxy, RowView};
use crate::builder;
use crate::error::{CoreError, CoreResult};
use crate::identity::ProxyId;
use crate::load::load_all;
use crate::schema::{TableSchema, HOUSEHOLD_MEMBERS};
use crate::state::HydrationState;
use crate::sync::{delete_all, reconcile, Association, Link};
use chrono::{DateTime, Utc};
use foodwaste_sql::{ColumnRef, SqlError, SqlValue, Statement};
use foodwaste_store::DataAccessor;

/// Membership level of a household member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Membership {
    /// Free membership.
    #[default]
    Basic = 1,
    /// Paid membership.
    Deluxe = 2,
    /// Paid membership with every feature.
    Premium = 3,
}

impl TryFrom<i32> for Membership {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        match value {
            1 => Ok(Self::Basic),
            2 => Ok(Self::Deluxe),
            3 => Ok(Self::Premium),
            other => Err(other),
        }
    }
}

/// A person who is a member of one or more households.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HouseholdMemberProxy {
    identifier: Option<ProxyId>,
    /// Mail address, unique per member.
    pub mail_address: String,
    /// Membership level.
    pub membership: Membership,
    /// Creation time, second precision.
    pub creation_time: DateTime<Utc>,
    /// Households the member belongs to.
    pub households: Vec<HouseholdProxy>,
    state: HydrationState,
}

impl HouseholdMemberProxy {
    /// Creates a household member.
    pub fn new(
        identifier: ProxyId,
        mail_address: impl Into<String>,
        membership: Membership,
        creation_time: DateTime<Utc>,
    ) -> Self {
        Self {
            identifier: Some(identifier),
            mail_address: mail_address.into(),
            membership,
            creation_time: truncate(creation_time),
            households: Vec::new(),
            state: HydrationState::RelationsLoaded,
        }
    }

    /// Selects the member with the given mail address.
    #[must_use]
    pub fn select_by_mail_address(mail_address: &str) -> Statement {
        builder::select_all(&HOUSEHOLD_MEMBERS)
            .filter_eq(ColumnRef::new("MailAddress"), mail_address)
            .into()
    }
}

fn memberships(household_member: &str) -> Association<MemberOfHouseholdProxy> {
    Association {
        name: "MemberOfHouseholds",
        existing: MemberOfHouseholdProxy::select_rows_for_member(household_member),
        target_of: |row| row.household_identifier,
        link: |member, household, ()| MemberOfHouseholdProxy::new(None, member, household, now()),
    }
}

impl DataProxy for HouseholdMemberProxy {
    const NAME: &'static str = "HouseholdMemberProxy";
    const SCHEMA: TableSchema = HOUSEHOLD_MEMBERS;

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
            SqlValue::text(&self.mail_address),
            SqlValue::from(self.membership as i32),
            SqlValue::from(self.creation_time),
        ])
    }

    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()> {
        self.identifier = Some(row.id("HouseholdMemberIdentifier")?);
        self.mail_address = row.text("MailAddress")?;
        let level = row.i32("Membership")?;
        self.membership = Membership::try_from(level).map_err(|value| {
            SqlError::invalid_value(row.name("Membership"), format!("unknown membership {value}"))
        })?;
        self.creation_time = row.timestamp("CreationTime")?;
        Ok(())
    }

    fn load_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        let rows: Vec<MemberOfHouseholdProxy> =
            load_all(accessor, &MemberOfHouseholdProxy::select_for_member(&id.to_key()))?;
        self.households = rows.into_iter().filter_map(|row| row.household).collect();
        Ok(())
    }

    fn holds_relations(&self) -> bool {
        !self.households.is_empty()
    }

    fn validate_relations(&self) -> CoreResult<()> {
        if self.households.iter().any(|h| h.identifier().is_none()) {
            return Err(CoreError::illegal_value("Households[].Identifier"));
        }
        Ok(())
    }

    fn store_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor, _is_new: bool) -> CoreResult<()> {
        let desired = self
            .households
            .iter()
            .filter_map(|h| h.identifier())
            .map(|household| Link::new(household, ()))
            .collect();
        reconcile(id, desired, &memberships(&id.to_key()), accessor)?;
        Ok(())
    }

    fn remove_relations(&mut self, id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        delete_all::<MemberOfHouseholdProxy>(
            &MemberOfHouseholdProxy::select_rows_for_member(&id.to_key()),
            accessor,
        )?;
        Ok(())
    }
}

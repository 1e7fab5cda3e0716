use super::{hydrate, key_value, truncate, DataProxy, HouseholdMemberProxy, HouseholdProxy, RowView};
use crate::builder;
use crate::error::CoreResult;
use crate::identity::ProxyId;
use crate::load::load_one;
use crate::schema::{TableSchema, HOUSEHOLDS, HOUSEHOLD_MEMBERS, MEMBER_OF_HOUSEHOLDS};
use crate::state::HydrationState;
use crate::sync::AssociationRow;
use chrono::{DateTime, Utc};
use foodwaste_sql::{Select, SqlValue, Statement};
use foodwaste_store::DataAccessor;

const JOINED_MEMBER_COLUMNS: &[&str] = &[
    "HouseholdMemberIdentifier",
    "MailAddress",
    "Membership",
    "HouseholdMemberCreationTime",
];

const JOINED_HOUSEHOLD_COLUMNS: &[&str] = &[
    "HouseholdIdentifier",
    "Name",
    "Descr",
    "HouseholdCreationTime",
];

/// Membership of a household member in a household.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberOfHouseholdProxy {
    identifier: Option<ProxyId>,
    /// Identifier of the member.
    pub household_member_identifier: Option<ProxyId>,
    /// Identifier of the household.
    pub household_identifier: Option<ProxyId>,
    /// The member, once loaded.
    pub household_member: Option<HouseholdMemberProxy>,
    /// The household, once loaded.
    pub household: Option<HouseholdProxy>,
    /// When the member joined, second precision.
    pub creation_time: DateTime<Utc>,
    state: HydrationState,
}

impl MemberOfHouseholdProxy {
    /// Creates a membership. The identifier is assigned on insert if absent.
    pub fn new(
        identifier: Option<ProxyId>,
        household_member: ProxyId,
        household: ProxyId,
        creation_time: DateTime<Utc>,
    ) -> Self {
        Self {
            identifier,
            household_member_identifier: Some(household_member),
            household_identifier: Some(household),
            creation_time: truncate(creation_time),
            state: HydrationState::RelationsLoaded,
            ..Self::default()
        }
    }

    /// Selects the memberships of a household joined with their members.
    #[must_use]
    pub fn select_for_household(household: &str) -> Statement {
        Select::from(MEMBER_OF_HOUSEHOLDS.aliased())
            .columns(MEMBER_OF_HOUSEHOLDS.qualified_refs())
            .column(HOUSEHOLD_MEMBERS.col("MailAddress"))
            .column(HOUSEHOLD_MEMBERS.col("Membership"))
            .column(HOUSEHOLD_MEMBERS.col("CreationTime").as_name("HouseholdMemberCreationTime"))
            .inner_join(
                HOUSEHOLD_MEMBERS.aliased(),
                HOUSEHOLD_MEMBERS.col("HouseholdMemberIdentifier"),
                MEMBER_OF_HOUSEHOLDS.col("HouseholdMemberIdentifier"),
            )
            .filter_eq(MEMBER_OF_HOUSEHOLDS.col("HouseholdIdentifier"), household)
            .order_by(HOUSEHOLD_MEMBERS.col("MailAddress"))
            .into()
    }

    /// Selects the memberships of a member joined with their households.
    #[must_use]
    pub fn select_for_member(household_member: &str) -> Statement {
        Select::from(MEMBER_OF_HOUSEHOLDS.aliased())
            .columns(MEMBER_OF_HOUSEHOLDS.qualified_refs())
            .column(HOUSEHOLDS.col("Name"))
            .column(HOUSEHOLDS.col("Descr"))
            .column(HOUSEHOLDS.col("CreationTime").as_name("HouseholdCreationTime"))
            .inner_join(
                HOUSEHOLDS.aliased(),
                HOUSEHOLDS.col("HouseholdIdentifier"),
                MEMBER_OF_HOUSEHOLDS.col("HouseholdIdentifier"),
            )
            .filter_eq(MEMBER_OF_HOUSEHOLDS.col("HouseholdMemberIdentifier"), household_member)
            .order_by(HOUSEHOLDS.col("Name"))
            .into()
    }

    /// Selects the stored membership rows of a household.
    #[must_use]
    pub fn select_rows_for_household(household: &str) -> Statement {
        builder::select_where(&MEMBER_OF_HOUSEHOLDS, "HouseholdIdentifier", household).into()
    }

    /// Selects the stored membership rows of a member.
    #[must_use]
    pub fn select_rows_for_member(household_member: &str) -> Statement {
        builder::select_where(&MEMBER_OF_HOUSEHOLDS, "HouseholdMemberIdentifier", household_member).into()
    }
}

impl DataProxy for MemberOfHouseholdProxy {
    const NAME: &'static str = "MemberOfHouseholdProxy";
    const SCHEMA: TableSchema = MEMBER_OF_HOUSEHOLDS;

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
            key_value(self.household_member_identifier, "HouseholdMemberIdentifier")?,
            key_value(self.household_identifier, "HouseholdIdentifier")?,
            SqlValue::from(self.creation_time),
        ])
    }

    fn read_columns(&mut self, row: &RowView<'_>) -> CoreResult<()> {
        self.identifier = Some(row.id("MemberOfHouseholdIdentifier")?);
        self.household_member_identifier = Some(row.id("HouseholdMemberIdentifier")?);
        self.household_identifier = Some(row.id("HouseholdIdentifier")?);
        self.creation_time = row.timestamp("CreationTime")?;
        if row.row().contains("MailAddress") {
            self.household_member = Some(hydrate(row.row(), JOINED_MEMBER_COLUMNS)?);
        }
        if row.row().contains("HouseholdCreationTime") {
            self.household = Some(hydrate(row.row(), JOINED_HOUSEHOLD_COLUMNS)?);
        }
        Ok(())
    }

    fn load_relations(&mut self, _id: ProxyId, accessor: &dyn DataAccessor) -> CoreResult<()> {
        if let Some(member) = self.household_member_identifier {
            self.household_member = load_one(
                accessor,
                &builder::select_by_key(&HOUSEHOLD_MEMBERS, &member.to_key()),
            )?;
        }
        if let Some(household) = self.household_identifier {
            self.household = load_one(accessor, &builder::select_by_key(&HOUSEHOLDS, &household.to_key()))?;
        }
        Ok(())
    }
}

impl AssociationRow for MemberOfHouseholdProxy {
    type Payload = ();

    fn payload(&self) {}

    fn set_payload(&mut self, _payload: ()) {}
}

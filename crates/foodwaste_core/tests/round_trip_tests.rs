//! Every aggregate's own columns survive an insert and a keyed read.

use foodwaste_core::{
    DataProviderProxy, DataProxy, FoodGroupProxy, FoodItemGroupProxy, FoodItemProxy,
    ForeignKeyProxy, HouseholdMemberProxy, HouseholdProxy, HydrationState, MemberOfHouseholdProxy,
    StaticTextProxy, StorageProxy, StorageTypeProxy, TranslationInfoProxy, TranslationProxy,
};
use foodwaste_store::{DataAccessor, DataReader};
use foodwaste_testkit::{
    culture_name_strategy, key_types_strategy, membership_strategy, proxy_id_strategy,
    temperature_range_strategy, timestamp_strategy, translation_value_strategy, TestStore,
};
use proptest::prelude::*;

/// One row of every aggregate, in an order that satisfies the foreign keys.
#[derive(Debug, Clone)]
struct Aggregates {
    culture: TranslationInfoProxy,
    provider: DataProviderProxy,
    translation: TranslationProxy,
    root: FoodGroupProxy,
    child: FoodGroupProxy,
    item: FoodItemProxy,
    item_group: FoodItemGroupProxy,
    foreign_key: ForeignKeyProxy,
    static_text: StaticTextProxy,
    storage_type: StorageTypeProxy,
    household: HouseholdProxy,
    storage: StorageProxy,
    member: HouseholdMemberProxy,
    member_of: MemberOfHouseholdProxy,
}

fn aggregates_strategy() -> impl Strategy<Value = Aggregates> {
    (
        prop::collection::vec(proxy_id_strategy(), 15),
        culture_name_strategy(),
        prop::collection::vec(translation_value_strategy(), 5),
        prop::array::uniform10(any::<bool>()),
        prop::array::uniform4(-40i32..40),
        prop::collection::vec(timestamp_strategy(), 3),
        membership_strategy(),
        key_types_strategy(),
        temperature_range_strategy(),
        proptest::option::of(translation_value_strategy()),
    )
        .prop_map(
            |(ids, culture_name, texts, flags, numbers, times, membership, types, range, description)| {
                let culture = TranslationInfoProxy::new(ids[0], culture_name);
                let provider = DataProviderProxy::new(ids[1], texts[0].clone(), flags[0], ids[2]);
                let translation =
                    TranslationProxy::new(Some(ids[3]), Some(ids[2]), culture.clone(), texts[1].clone());
                let root = FoodGroupProxy::new(ids[4], None, flags[1]);
                let child = FoodGroupProxy::new(ids[5], Some(&root), flags[2]);
                let item = FoodItemProxy::new(ids[6], None, flags[3]);
                let item_group = FoodItemGroupProxy::new(Some(ids[7]), ids[6], ids[5], flags[4]);
                let type_names: Vec<&str> = types.iter().map(String::as_str).collect();
                let foreign_key = ForeignKeyProxy::new(
                    Some(ids[8]),
                    provider.clone(),
                    Some(ids[6]),
                    &type_names,
                    texts[2].clone(),
                );
                let static_text =
                    StaticTextProxy::new(ids[9], numbers[0], ids[2], flags[5].then_some(ids[3]));
                let storage_type = StorageTypeProxy::new(
                    ids[10], numbers[1], numbers[2], range, flags[6], flags[7], flags[8],
                );
                let household = HouseholdProxy::new(ids[11], texts[3].clone(), description.clone(), times[0]);
                let storage = StorageProxy::new(
                    Some(ids[12]),
                    Some(ids[11]),
                    numbers[3],
                    storage_type.clone(),
                    if flags[9] { description } else { None },
                    numbers[2],
                    times[1],
                );
                let member = HouseholdMemberProxy::new(ids[13], texts[4].clone(), membership, times[2]);
                let member_of = MemberOfHouseholdProxy::new(Some(ids[14]), ids[13], ids[11], times[2]);
                Aggregates {
                    culture,
                    provider,
                    translation,
                    root,
                    child,
                    item,
                    item_group,
                    foreign_key,
                    static_text,
                    storage_type,
                    household,
                    storage,
                    member,
                    member_of,
                }
            },
        )
}

fn insert<P: DataProxy>(accessor: &mut Box<dyn DataAccessor>, proxy: &P) {
    accessor.execute(&proxy.build_insert().unwrap()).unwrap();
}

impl Aggregates {
    fn insert_all(&self, accessor: &mut Box<dyn DataAccessor>) {
        insert(accessor, &self.culture);
        insert(accessor, &self.provider);
        insert(accessor, &self.translation);
        insert(accessor, &self.root);
        insert(accessor, &self.child);
        insert(accessor, &self.item);
        insert(accessor, &self.item_group);
        insert(accessor, &self.foreign_key);
        insert(accessor, &self.static_text);
        insert(accessor, &self.storage_type);
        insert(accessor, &self.household);
        insert(accessor, &self.storage);
        insert(accessor, &self.member);
        insert(accessor, &self.member_of);
    }
}

/// Reads `stored` back by key and maps its scalars.
fn read_back<P: DataProxy>(accessor: &mut Box<dyn DataAccessor>, stored: &P) -> P {
    let mut reader = accessor.query(&stored.build_select().unwrap()).unwrap();
    assert!(reader.read(), "no {} row", P::NAME);
    let mut loaded = P::default();
    loaded.map_data(&reader, &**accessor).unwrap();
    assert!(!reader.read(), "several {} rows", P::NAME);
    assert_eq!(loaded.state(), HydrationState::ScalarsLoaded);
    loaded
}

fn same_columns<P: DataProxy>(loaded: &P, stored: &P) -> Result<(), TestCaseError> {
    prop_assert_eq!(
        loaded.column_values().unwrap(),
        stored.column_values().unwrap(),
        "{} columns differ",
        P::NAME
    );
    Ok(())
}

fn check_round_trips(accessor: &mut Box<dyn DataAccessor>, stored: &Aggregates) -> Result<(), TestCaseError> {
    stored.insert_all(accessor);

    let culture = read_back(accessor, &stored.culture);
    same_columns(&culture, &stored.culture)?;
    prop_assert_eq!(&culture.culture_name, &stored.culture.culture_name);

    let provider = read_back(accessor, &stored.provider);
    same_columns(&provider, &stored.provider)?;
    prop_assert_eq!(&provider.name, &stored.provider.name);
    prop_assert_eq!(provider.handles_payments, stored.provider.handles_payments);
    prop_assert_eq!(
        provider.data_source_statement_identifier,
        stored.provider.data_source_statement_identifier
    );

    let translation = read_back(accessor, &stored.translation);
    same_columns(&translation, &stored.translation)?;
    prop_assert_eq!(&translation.value, &stored.translation.value);
    prop_assert_eq!(translation.of_identifier, stored.translation.of_identifier);
    prop_assert_eq!(translation.culture_name(), stored.culture.culture_name.as_str());

    let root = read_back(accessor, &stored.root);
    same_columns(&root, &stored.root)?;
    prop_assert!(root.is_root());
    let child = read_back(accessor, &stored.child);
    same_columns(&child, &stored.child)?;
    prop_assert_eq!(child.parent_identifier, stored.root.identifier());
    prop_assert_eq!(child.is_active, stored.child.is_active);

    let item = read_back(accessor, &stored.item);
    same_columns(&item, &stored.item)?;
    prop_assert_eq!(item.is_active, stored.item.is_active);

    let item_group = read_back(accessor, &stored.item_group);
    same_columns(&item_group, &stored.item_group)?;
    prop_assert_eq!(item_group.food_item_identifier, stored.item.identifier());
    prop_assert_eq!(item_group.food_group_identifier, stored.child.identifier());
    prop_assert_eq!(item_group.is_primary, stored.item_group.is_primary);

    let foreign_key = read_back(accessor, &stored.foreign_key);
    same_columns(&foreign_key, &stored.foreign_key)?;
    prop_assert_eq!(&foreign_key.foreign_key_for_types, &stored.foreign_key.foreign_key_for_types);
    prop_assert_eq!(&foreign_key.foreign_key_value, &stored.foreign_key.foreign_key_value);
    prop_assert_eq!(foreign_key.foreign_key_for_identifier, stored.item.identifier());
    prop_assert_eq!(&foreign_key.data_provider.name, &stored.provider.name);
    prop_assert_eq!(
        foreign_key.data_provider.handles_payments,
        stored.provider.handles_payments
    );

    let static_text = read_back(accessor, &stored.static_text);
    same_columns(&static_text, &stored.static_text)?;
    prop_assert_eq!(static_text.static_text_type, stored.static_text.static_text_type);
    prop_assert_eq!(
        static_text.subject_translation_identifier,
        stored.static_text.subject_translation_identifier
    );
    prop_assert_eq!(
        static_text.body_translation_identifier,
        stored.static_text.body_translation_identifier
    );

    let storage_type = read_back(accessor, &stored.storage_type);
    same_columns(&storage_type, &stored.storage_type)?;
    prop_assert_eq!(storage_type.sort_order, stored.storage_type.sort_order);
    prop_assert_eq!(storage_type.temperature, stored.storage_type.temperature);
    prop_assert_eq!(storage_type.temperature_range, stored.storage_type.temperature_range);
    prop_assert_eq!(
        (storage_type.creatable, storage_type.editable, storage_type.deletable),
        (
            stored.storage_type.creatable,
            stored.storage_type.editable,
            stored.storage_type.deletable
        )
    );

    let household = read_back(accessor, &stored.household);
    same_columns(&household, &stored.household)?;
    prop_assert_eq!(&household.name, &stored.household.name);
    prop_assert_eq!(&household.description, &stored.household.description);
    prop_assert_eq!(household.creation_time, stored.household.creation_time);

    let storage = read_back(accessor, &stored.storage);
    same_columns(&storage, &stored.storage)?;
    same_columns(&storage.storage_type, &stored.storage_type)?;
    prop_assert_eq!(storage.household_identifier, stored.household.identifier());
    prop_assert_eq!(&storage.description, &stored.storage.description);
    prop_assert_eq!(storage.creation_time, stored.storage.creation_time);

    let member = read_back(accessor, &stored.member);
    same_columns(&member, &stored.member)?;
    prop_assert_eq!(&member.mail_address, &stored.member.mail_address);
    prop_assert_eq!(member.membership, stored.member.membership);
    prop_assert_eq!(member.creation_time, stored.member.creation_time);

    let member_of = read_back(accessor, &stored.member_of);
    same_columns(&member_of, &stored.member_of)?;
    prop_assert_eq!(member_of.household_member_identifier, stored.member.identifier());
    prop_assert_eq!(member_of.household_identifier, stored.household.identifier());
    prop_assert_eq!(member_of.creation_time, stored.member_of.creation_time);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_aggregate_round_trips_in_memory(stored in aggregates_strategy()) {
        let store = TestStore::memory();
        let mut accessor = store.accessor();
        check_round_trips(&mut accessor, &stored)?;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn every_aggregate_round_trips_in_sqlite(stored in aggregates_strategy()) {
        let store = TestStore::sqlite();
        let mut accessor = store.accessor();
        check_round_trips(&mut accessor, &stored)?;
    }
}

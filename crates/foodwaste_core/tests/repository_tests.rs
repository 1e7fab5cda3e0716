//! Aggregate round trips through the repository on the in-memory store.

use foodwaste_core::{
    CoreError, DataProxy, EngineConfig, FoodGroupProxy, FoodItemProxy, ForeignKeyProxy,
    HouseholdMemberProxy, HouseholdProxy, HydrationState, Membership, ProxyId, Repository,
    StaticTextProxy, StorageProxy, TranslationProxy,
};
use foodwaste_testkit::{fixed_time, id_of, translation, Fixture, TestStore};

fn seeded() -> (TestStore, Repository, Fixture) {
    let store = TestStore::memory();
    let mut repository = store.repository();
    let fixture = Fixture::seed(&mut repository);
    (store, repository, fixture)
}

fn group_ids(item: &FoodItemProxy) -> Vec<ProxyId> {
    let mut ids: Vec<ProxyId> = item.food_groups.iter().map(|g| id_of(g)).collect();
    ids.sort();
    ids
}

#[test]
fn food_item_round_trip() {
    let (store, mut repository, fixture) = seeded();
    let mut item = FoodItemProxy::new(ProxyId::new(), Some(fixture.dairy.clone()), true);
    item.add_food_group(fixture.bakery.clone());
    item.translations.push(translation(&fixture.danish, "Mælk"));
    item.foreign_keys.push(ForeignKeyProxy::new(
        None,
        fixture.provider.clone(),
        None,
        &["FoodItem"],
        "1234",
    ));

    let added = repository.add(item).unwrap();

    assert_eq!(added.state(), HydrationState::RelationsLoaded);
    assert_eq!(
        added.primary_food_group.as_ref().map(|g| id_of(g)),
        Some(id_of(&fixture.dairy))
    );
    let mut expected = vec![id_of(&fixture.dairy), id_of(&fixture.bakery)];
    expected.sort();
    assert_eq!(group_ids(&added), expected);
    assert_eq!(added.translations[0].value, "Mælk");
    assert_eq!(added.foreign_keys[0].foreign_key_value, "1234");
    assert_eq!(added.foreign_keys[0].foreign_key_for_types, vec!["FoodItem".to_string()]);
    assert_eq!(added.foreign_keys[0].data_provider.name, "Provider");

    let in_bakery = repository.food_items_in_group(id_of(&fixture.bakery)).unwrap();
    assert_eq!(in_bakery.len(), 1);
    assert_eq!(in_bakery[0].identifier(), added.identifier());

    let memory = store.journal().unwrap();
    assert_eq!(memory.row_count("FoodItemGroups"), 2);
    assert_eq!(memory.row_count("ForeignKeys"), 1);
}

#[test]
fn save_replaces_group_set() {
    let (store, mut repository, fixture) = seeded();
    let mut item = FoodItemProxy::new(ProxyId::new(), Some(fixture.dairy.clone()), true);
    item.add_food_group(fixture.bakery.clone());
    let mut item = repository.add(item).unwrap();

    item.remove_food_group(id_of(&fixture.bakery));
    item.add_food_group(fixture.cheese.clone());
    item.is_active = false;
    let saved = repository.save(item).unwrap();

    let mut expected = vec![id_of(&fixture.dairy), id_of(&fixture.cheese)];
    expected.sort();
    assert_eq!(group_ids(&saved), expected);
    assert!(!saved.is_active);
    assert!(repository
        .food_items_in_group(id_of(&fixture.bakery))
        .unwrap()
        .is_empty());
    assert_eq!(store.journal().unwrap().row_count("FoodItemGroups"), 2);
}

#[test]
fn delete_removes_dependent_rows() {
    let (store, mut repository, fixture) = seeded();
    let mut item = FoodItemProxy::new(ProxyId::new(), Some(fixture.dairy.clone()), true);
    item.translations.push(translation(&fixture.english, "Milk"));
    let item = repository.add(item).unwrap();
    let id = id_of(&item);

    repository.delete(item).unwrap();

    let memory = store.journal().unwrap();
    assert_eq!(memory.row_count("FoodItems"), 0);
    assert_eq!(memory.row_count("FoodItemGroups"), 0);
    // The data provider's statement translation remains.
    assert_eq!(memory.row_count("Translations"), 1);
    assert!(matches!(
        repository.find::<FoodItemProxy>(id),
        Err(CoreError::NotFound { .. })
    ));
}

#[test]
fn deleting_a_group_cascades_to_children_and_memberships() {
    let (store, mut repository, fixture) = seeded();
    let item = FoodItemProxy::new(ProxyId::new(), Some(fixture.cheese.clone()), true);
    repository.add(item).unwrap();

    let dairy: FoodGroupProxy = repository.find(id_of(&fixture.dairy)).unwrap();
    assert_eq!(dairy.children.len(), 1);
    repository.delete(dairy).unwrap();

    let memory = store.journal().unwrap();
    assert_eq!(memory.row_count("FoodGroups"), 1);
    assert_eq!(memory.row_count("FoodItemGroups"), 0);
    let roots = repository.root_food_groups().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].identifier(), fixture.bakery.identifier());
}

#[test]
fn child_group_loads_its_parent() {
    let (_store, mut repository, fixture) = seeded();

    let cheese: FoodGroupProxy = repository.find(id_of(&fixture.cheese)).unwrap();

    assert!(!cheese.is_root());
    assert_eq!(
        cheese.parent.as_ref().and_then(|p| p.identifier()),
        fixture.dairy.identifier()
    );
}

#[test]
fn reference_data_cannot_be_added() {
    let (store, mut repository, _fixture) = seeded();
    let memory = store.journal().unwrap();
    memory.reset_journal();

    let err = repository
        .add(StaticTextProxy::new(ProxyId::new(), 1, ProxyId::new(), None))
        .unwrap_err();

    assert!(matches!(err, CoreError::Unsupported { .. }));
    assert!(memory.journal().is_empty());
}

#[test]
fn static_text_is_read_by_type() {
    let (_store, mut repository, fixture) = seeded();
    let subject = ProxyId::new();
    let body = ProxyId::new();
    repository
        .seed(&StaticTextProxy::new(ProxyId::new(), 7, subject, Some(body)))
        .unwrap();
    repository
        .seed(&StaticTextProxy::new(ProxyId::new(), 8, ProxyId::new(), None))
        .unwrap();
    for (of, culture, value) in [
        (subject, &fixture.english, "Welcome"),
        (subject, &fixture.danish, "Velkommen"),
        (body, &fixture.danish, "Tak fordi du er med"),
    ] {
        repository
            .seed(&TranslationProxy::new(Some(ProxyId::new()), Some(of), culture.clone(), value))
            .unwrap();
    }

    let text = repository.static_text(7).unwrap();

    assert_eq!(text.static_text_type, 7);
    assert_eq!(text.subject_translation_identifier, Some(subject));
    let subjects: Vec<&str> = text.subject_translations.iter().map(|t| t.culture_name()).collect();
    assert_eq!(subjects, vec!["da-DK", "en-US"]);
    assert_eq!(text.body_translations.len(), 1);
    assert_eq!(text.body_translations[0].value, "Tak fordi du er med");

    let err = repository.static_text(9).unwrap_err();
    assert!(matches!(err, CoreError::NotFound { table: "StaticTexts", .. }));
}

#[test]
fn saving_a_missing_aggregate_is_not_found() {
    let (_store, mut repository, _fixture) = seeded();

    let err = repository
        .save(FoodGroupProxy::new(ProxyId::new(), None, true))
        .unwrap_err();

    assert!(matches!(err, CoreError::NotFound { table: "FoodGroups", .. }));
}

#[test]
fn unverified_save_of_missing_aggregate_succeeds_quietly() {
    let store = TestStore::memory();
    let config = EngineConfig::default().verify_writes(false);
    let mut repository = Repository::with_config(store.accessor(), config);

    let err = repository
        .save(FoodGroupProxy::new(ProxyId::new(), None, true))
        .unwrap_err();

    // The write passes; reading the aggregate back does not.
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[test]
fn lazy_reads_stop_after_scalars() {
    let store = TestStore::memory();
    let mut repository = store.repository();
    let fixture = Fixture::seed(&mut repository);
    let config = EngineConfig::default().eager_relations(false);
    let mut lazy = Repository::with_config(store.accessor(), config);

    let mut dairy: FoodGroupProxy = lazy.find(id_of(&fixture.dairy)).unwrap();

    assert_eq!(dairy.state(), HydrationState::ScalarsLoaded);
    assert!(dairy.children.is_empty());
    dairy.map_relations(lazy.accessor()).unwrap();
    assert_eq!(dairy.children.len(), 1);
}

#[test]
fn lazy_edits_need_loaded_relations() {
    let store = TestStore::memory();
    let mut repository = store.repository();
    let fixture = Fixture::seed(&mut repository);
    let item = repository
        .add(FoodItemProxy::new(ProxyId::new(), Some(fixture.dairy.clone()), true))
        .unwrap();
    let mut lazy = Repository::with_config(
        store.accessor(),
        EngineConfig::default().eager_relations(false),
    );
    let memory = store.journal().unwrap();

    let mut loaded: FoodItemProxy = lazy.find(id_of(&item)).unwrap();
    loaded.add_food_group(fixture.bakery.clone());
    memory.reset_journal();

    let err = lazy.save(loaded).unwrap_err();

    assert!(matches!(err, CoreError::RelationsNotLoaded { proxy: "FoodItemProxy" }));
    assert!(memory.journal().is_empty());
    let stored: FoodItemProxy = repository.find(id_of(&item)).unwrap();
    assert_eq!(group_ids(&stored), vec![id_of(&fixture.dairy)]);

    let mut loaded: FoodItemProxy = lazy.find(id_of(&item)).unwrap();
    loaded.map_relations(lazy.accessor()).unwrap();
    loaded.add_food_group(fixture.bakery.clone());
    lazy.save(loaded).unwrap();

    let stored: FoodItemProxy = repository.find(id_of(&item)).unwrap();
    let mut expected = vec![id_of(&fixture.dairy), id_of(&fixture.bakery)];
    expected.sort();
    assert_eq!(group_ids(&stored), expected);
    assert_eq!(
        stored.primary_food_group.as_ref().map(|g| id_of(g)),
        Some(id_of(&fixture.dairy))
    );
}

#[test]
fn household_members_and_storages() {
    let (store, mut repository, fixture) = seeded();
    let anna = repository
        .add(HouseholdMemberProxy::new(
            ProxyId::new(),
            "anna@example.org",
            Membership::Premium,
            fixed_time(),
        ))
        .unwrap();
    let bo = repository
        .add(HouseholdMemberProxy::new(
            ProxyId::new(),
            "bo@example.org",
            Membership::Basic,
            fixed_time(),
        ))
        .unwrap();

    let mut household = HouseholdProxy::new(ProxyId::new(), "Home", None, fixed_time());
    household.household_members.push(anna.clone());
    household.household_members.push(bo.clone());
    household.storages.push(StorageProxy::new(
        None,
        None,
        1,
        fixture.refrigerator.clone(),
        Some("Kitchen".to_string()),
        4,
        fixed_time(),
    ));
    let household = repository.add(household).unwrap();

    let mails: Vec<&str> = household
        .household_members
        .iter()
        .map(|m| m.mail_address.as_str())
        .collect();
    assert_eq!(mails, vec!["anna@example.org", "bo@example.org"]);
    assert_eq!(household.storages.len(), 1);
    assert_eq!(household.storages[0].storage_type.temperature_range, fixture.refrigerator.temperature_range);
    assert_eq!(household.storages[0].household_identifier, household.identifier());

    let of_anna = repository.households_of(id_of(&anna)).unwrap();
    assert_eq!(of_anna.len(), 1);
    assert_eq!(of_anna[0].name, "Home");
    assert_eq!(of_anna[0].storages.len(), 1);

    let mut household = household;
    household.household_members.retain(|m| m.identifier() == bo.identifier());
    household.storages[0].temperature = 6;
    let memory = store.journal().unwrap();
    memory.reset_journal();
    let household = repository.save(household).unwrap();

    let writes: Vec<String> = memory.writes().into_iter().map(|w| w.text).collect();
    assert_eq!(writes.len(), 3, "{writes:#?}");
    assert!(writes[0].starts_with("UPDATE Households SET "));
    assert!(writes[1].starts_with("DELETE FROM MemberOfHouseholds WHERE "));
    assert!(writes[2].starts_with("UPDATE Storages SET "));
    assert_eq!(household.household_members.len(), 1);
    assert_eq!(household.storages[0].temperature, 6);
    assert!(repository.households_of(id_of(&anna)).unwrap().is_empty());
}

#[test]
fn deleting_a_household_keeps_its_members() {
    let (store, mut repository, fixture) = seeded();
    let member = repository
        .add(HouseholdMemberProxy::new(
            ProxyId::new(),
            "anna@example.org",
            Membership::Deluxe,
            fixed_time(),
        ))
        .unwrap();
    let mut household = HouseholdProxy::new(ProxyId::new(), "Cabin", None, fixed_time());
    household.household_members.push(member.clone());
    household.storages.push(StorageProxy::new(
        None,
        None,
        1,
        fixture.refrigerator.clone(),
        None,
        3,
        fixed_time(),
    ));
    let household = repository.add(household).unwrap();

    repository.delete(household).unwrap();

    let memory = store.journal().unwrap();
    assert_eq!(memory.row_count("Households"), 0);
    assert_eq!(memory.row_count("Storages"), 0);
    assert_eq!(memory.row_count("MemberOfHouseholds"), 0);
    let member: HouseholdMemberProxy = repository.find(id_of(&member)).unwrap();
    assert_eq!(member.membership, Membership::Deluxe);
    assert!(member.households.is_empty());
}

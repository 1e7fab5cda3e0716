//! Guards and hydration of the data proxy protocol.

use foodwaste_core::{
    CoreError, DataProxy, FoodGroupProxy, FoodItemProxy, HydrationState, ProxyId, StaticTextProxy,
    StorageTypeProxy, TemperatureRange, TranslationInfoProxy, TranslationProxy,
};
use foodwaste_sql::StatementKind;
use foodwaste_store::{DataAccessor, DataReader, MemoryAccessor};
use foodwaste_testkit::{id_of, translation, TestStore};

fn memory_store() -> (TestStore, MemoryAccessor, Box<dyn DataAccessor>) {
    let store = TestStore::memory();
    let memory = store.journal().unwrap().clone();
    let accessor = store.accessor();
    (store, memory, accessor)
}

#[test]
fn map_relations_without_identifier_issues_no_query() {
    let (_store, memory, accessor) = memory_store();
    let mut item = FoodItemProxy::default();

    let err = item.map_relations(&*accessor).unwrap_err();

    assert_eq!(err.illegal_field(), Some("Identifier"));
    assert!(memory.journal().is_empty());
    assert_eq!(memory.clone_count(), 0);
}

#[test]
fn delete_relations_on_empty_store_only_reads() {
    let (_store, memory, accessor) = memory_store();
    let mut item = FoodItemProxy::new(ProxyId::new(), None, true);

    item.delete_relations(&*accessor).unwrap();

    let journal = memory.journal();
    assert_eq!(journal.len(), 3);
    assert!(journal.iter().all(|e| e.kind == StatementKind::Select));
    assert_eq!(memory.clone_count(), 3);
}

#[test]
fn delete_relations_without_identifier_fails_first() {
    let (_store, memory, accessor) = memory_store();
    let mut group = FoodGroupProxy::default();

    let err = group.delete_relations(&*accessor).unwrap_err();

    assert!(matches!(err, CoreError::IllegalValue { .. }));
    assert!(memory.journal().is_empty());
}

#[test]
fn reference_data_rejects_writes() {
    let (_store, memory, accessor) = memory_store();
    let mut text = StaticTextProxy::new(ProxyId::new(), 1, ProxyId::new(), None);
    let mut storage_type = StorageTypeProxy::new(
        ProxyId::new(),
        1,
        4,
        TemperatureRange::new(1, 6),
        true,
        true,
        false,
    );

    assert!(matches!(
        text.save_relations(&*accessor, true),
        Err(CoreError::Unsupported { .. })
    ));
    assert!(matches!(
        text.delete_relations(&*accessor),
        Err(CoreError::Unsupported { .. })
    ));
    assert!(matches!(
        storage_type.save_relations(&*accessor, false),
        Err(CoreError::Unsupported { .. })
    ));
    assert!(memory.journal().is_empty());
}

#[test]
fn unsupported_is_reported_before_missing_identifier() {
    let (_store, _memory, accessor) = memory_store();
    let mut text = StaticTextProxy::default();

    let err = text.delete_relations(&*accessor).unwrap_err();

    assert!(matches!(err, CoreError::Unsupported { .. }));
}

#[test]
fn primary_group_without_identifier_fails_before_io() {
    let (_store, memory, accessor) = memory_store();
    let mut item = FoodItemProxy::new(ProxyId::new(), Some(FoodGroupProxy::default()), true);

    let err = item.save_relations(&*accessor, true).unwrap_err();

    assert_eq!(err.illegal_field(), Some("PrimaryFoodGroup.Identifier"));
    assert!(memory.journal().is_empty());
}

#[test]
fn translation_without_culture_names_the_path() {
    let (_store, memory, accessor) = memory_store();
    let mut item = FoodItemProxy::new(ProxyId::new(), None, true);
    item.translations
        .push(TranslationProxy::new(None, None, TranslationInfoProxy::default(), "Milk"));

    let err = item.save_relations(&*accessor, true).unwrap_err();

    assert_eq!(err.illegal_field(), Some("Translations[].TranslationInfo.Identifier"));
    assert!(memory.writes().is_empty());
}

#[test]
fn scalars_then_relations() {
    let (_store, memory, mut accessor) = memory_store();
    let culture = TranslationInfoProxy::new(ProxyId::new(), "en-US");
    accessor.execute(&culture.build_insert().unwrap()).unwrap();
    let group = FoodGroupProxy::new(ProxyId::new(), None, true);
    accessor.execute(&group.build_insert().unwrap()).unwrap();
    let mut item = FoodItemProxy::new(ProxyId::new(), Some(group.clone()), true);
    item.translations.push(translation(&culture, "Milk"));
    accessor.execute(&item.build_insert().unwrap()).unwrap();
    item.save_relations(&*accessor, true).unwrap();
    memory.reset_journal();

    let query = FoodItemProxy::keyed(id_of(&item));
    let mut reader = accessor.query(&query.build_select().unwrap()).unwrap();
    assert!(reader.read());
    let mut loaded = FoodItemProxy::default();
    loaded.map_data(&reader, &*accessor).unwrap();

    assert_eq!(loaded.state(), HydrationState::ScalarsLoaded);
    assert!(loaded.food_groups.is_empty());
    assert_eq!(memory.clone_count(), 0);

    loaded.map_relations(&*accessor).unwrap();

    assert_eq!(loaded.state(), HydrationState::RelationsLoaded);
    assert_eq!(
        loaded.primary_food_group.as_ref().and_then(|g| g.identifier()),
        group.identifier()
    );
    assert_eq!(loaded.food_groups.len(), 1);
    assert_eq!(loaded.translations.len(), 1);
    assert_eq!(loaded.translations[0].value, "Milk");
    assert_eq!(loaded.translations[0].translation_info.culture_name, "en-US");
}

#[test]
fn saving_scalars_only_proxy_keeps_stored_relations() {
    let (_store, memory, mut accessor) = memory_store();
    let group = FoodGroupProxy::new(ProxyId::new(), None, true);
    accessor.execute(&group.build_insert().unwrap()).unwrap();
    let mut item = FoodItemProxy::new(ProxyId::new(), Some(group), true);
    accessor.execute(&item.build_insert().unwrap()).unwrap();
    item.save_relations(&*accessor, true).unwrap();

    let query = FoodItemProxy::keyed(id_of(&item));
    let mut reader = accessor.query(&query.build_select().unwrap()).unwrap();
    assert!(reader.read());
    let mut loaded = FoodItemProxy::default();
    loaded.map_data(&reader, &*accessor).unwrap();
    memory.reset_journal();

    loaded.save_relations(&*accessor, false).unwrap();

    assert!(memory.writes().is_empty());
    assert_eq!(memory.row_count("FoodItemGroups"), 1);
    assert_eq!(loaded.state(), HydrationState::RelationsLoaded);
}

#[test]
fn relation_edits_before_loading_are_rejected() {
    let (_store, memory, mut accessor) = memory_store();
    let dairy = FoodGroupProxy::new(ProxyId::new(), None, true);
    let bakery = FoodGroupProxy::new(ProxyId::new(), None, true);
    accessor.execute(&dairy.build_insert().unwrap()).unwrap();
    accessor.execute(&bakery.build_insert().unwrap()).unwrap();
    let mut item = FoodItemProxy::new(ProxyId::new(), Some(dairy), true);
    accessor.execute(&item.build_insert().unwrap()).unwrap();
    item.save_relations(&*accessor, true).unwrap();

    let query = FoodItemProxy::keyed(id_of(&item));
    let mut reader = accessor.query(&query.build_select().unwrap()).unwrap();
    assert!(reader.read());
    let mut loaded = FoodItemProxy::default();
    loaded.map_data(&reader, &*accessor).unwrap();
    loaded.add_food_group(bakery);
    memory.reset_journal();

    let err = loaded.save_relations(&*accessor, false).unwrap_err();

    assert!(matches!(err, CoreError::RelationsNotLoaded { .. }));
    assert!(memory.journal().is_empty());
    assert_eq!(memory.clone_count(), 0);
    assert_eq!(memory.row_count("FoodItemGroups"), 1);
    assert_eq!(loaded.state(), HydrationState::ScalarsLoaded);
}

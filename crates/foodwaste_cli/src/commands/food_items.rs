//! Food item commands.

use super::{print_json, translations_line, TranslationOutput};
use foodwaste_core::{DataProxy, FoodGroupProxy, FoodItemProxy, ProxyId, Repository};
use serde::Serialize;
use tracing::info;

/// A food item with its group memberships.
#[derive(Debug, Serialize)]
pub struct FoodItemOutput {
    /// Identifier.
    pub id: String,
    /// Whether the item is active.
    pub is_active: bool,
    /// Primary food group identifier.
    pub primary_food_group: Option<String>,
    /// Identifiers of every group the item belongs to.
    pub food_groups: Vec<String>,
    /// Translated names.
    pub translations: Vec<TranslationOutput>,
    /// Number of foreign keys held by data providers.
    pub foreign_keys: usize,
}

impl FoodItemOutput {
    fn from_proxy(item: &FoodItemProxy) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            id: item.unique_id()?,
            is_active: item.is_active,
            primary_food_group: item
                .primary_food_group
                .as_ref()
                .map(|g| g.unique_id())
                .transpose()?,
            food_groups: item
                .food_groups
                .iter()
                .map(|g| g.unique_id())
                .collect::<Result<_, _>>()?,
            translations: item.translations.iter().map(TranslationOutput::from).collect(),
            foreign_keys: item.foreign_keys.len(),
        })
    }
}

/// Reads a food item for display.
pub fn describe(repository: &mut Repository, id: ProxyId) -> Result<FoodItemOutput, Box<dyn std::error::Error>> {
    let item: FoodItemProxy = repository.find(id)?;
    FoodItemOutput::from_proxy(&item)
}

/// Runs the food-item command.
pub fn show(repository: &mut Repository, id: ProxyId, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let item = describe(repository, id)?;
    match format {
        "json" => print_json(&item)?,
        _ => {
            println!("Food item {}", item.id);
            println!("  Active:        {}", item.is_active);
            println!(
                "  Primary group: {}",
                item.primary_food_group.as_deref().unwrap_or("-")
            );
            println!("  Groups:        {}", item.food_groups.join(", "));
            let names = translations_line(&item.translations);
            if !names.is_empty() {
                println!("  Names:         {names}");
            }
            println!("  Foreign keys:  {}", item.foreign_keys);
        }
    }
    Ok(())
}

/// Adds a food item in `primary` and `groups`, returning its identifier.
pub fn create(
    repository: &mut Repository,
    primary: ProxyId,
    groups: &[ProxyId],
    is_active: bool,
) -> Result<ProxyId, Box<dyn std::error::Error>> {
    let primary: FoodGroupProxy = repository.find(primary)?;
    let mut item = FoodItemProxy::new(ProxyId::new(), Some(primary), is_active);
    for id in groups {
        item.add_food_group(repository.find::<FoodGroupProxy>(*id)?);
    }
    let item = repository.add(item)?;
    let id = item.identifier().ok_or("food item stored without identifier")?;
    info!(id = %id, groups = item.food_groups.len(), "food item added");
    Ok(id)
}

/// Runs the add-food-item command.
pub fn add(
    repository: &mut Repository,
    primary: ProxyId,
    groups: &[ProxyId],
    is_active: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = create(repository, primary, groups, is_active)?;
    println!("{id}");
    Ok(())
}

/// Runs the delete-food-item command.
pub fn delete(repository: &mut Repository, id: ProxyId) -> Result<(), Box<dyn std::error::Error>> {
    let item: FoodItemProxy = repository.find(id)?;
    repository.delete(item)?;
    println!("Deleted {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodwaste_testkit::{id_of, Fixture, TestStore};

    #[test]
    fn create_then_describe() {
        let store = TestStore::memory();
        let mut repository = store.repository();
        let fixture = Fixture::seed(&mut repository);

        let id = create(
            &mut repository,
            id_of(&fixture.cheese),
            &[id_of(&fixture.bakery), id_of(&fixture.cheese)],
            true,
        )
        .unwrap();
        let item = describe(&mut repository, id).unwrap();

        assert_eq!(item.primary_food_group, Some(id_of(&fixture.cheese).to_key()));
        assert_eq!(item.food_groups.len(), 2);
        assert_eq!(store.journal().unwrap().row_count("FoodItemGroups"), 2);
    }

    #[test]
    fn unknown_group_adds_nothing() {
        let store = TestStore::memory();
        let mut repository = store.repository();

        assert!(create(&mut repository, ProxyId::new(), &[], true).is_err());
        assert_eq!(store.journal().unwrap().row_count("FoodItems"), 0);
    }

    #[test]
    fn delete_removes_memberships() {
        let store = TestStore::sqlite();
        let mut repository = store.repository();
        let fixture = Fixture::seed(&mut repository);
        let id = create(&mut repository, id_of(&fixture.dairy), &[], true).unwrap();

        delete(&mut repository, id).unwrap();

        assert!(describe(&mut repository, id).is_err());
        assert!(repository
            .food_items_in_group(id_of(&fixture.dairy))
            .unwrap()
            .is_empty());
    }
}

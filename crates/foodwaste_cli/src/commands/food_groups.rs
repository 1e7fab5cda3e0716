//! Food group commands.

use super::{print_json, translations_line, TranslationOutput};
use foodwaste_core::{DataProxy, FoodGroupProxy, ProxyId, Repository};
use serde::Serialize;

/// A food group with its subtree.
#[derive(Debug, Serialize)]
pub struct FoodGroupOutput {
    /// Identifier.
    pub id: String,
    /// Whether the group is active.
    pub is_active: bool,
    /// Translated names.
    pub translations: Vec<TranslationOutput>,
    /// Child groups.
    pub children: Vec<FoodGroupOutput>,
}

fn tree(repository: &mut Repository, group: &FoodGroupProxy) -> Result<FoodGroupOutput, Box<dyn std::error::Error>> {
    let id = group.unique_id()?;
    let children = repository.get_collection::<FoodGroupProxy>(&FoodGroupProxy::select_children(&id))?;
    let children = children
        .iter()
        .map(|child| tree(repository, child))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FoodGroupOutput {
        id,
        is_active: group.is_active,
        translations: group.translations.iter().map(TranslationOutput::from).collect(),
        children,
    })
}

/// Builds the tree of every root group.
pub fn forest(repository: &mut Repository) -> Result<Vec<FoodGroupOutput>, Box<dyn std::error::Error>> {
    let roots = repository.root_food_groups()?;
    roots.iter().map(|root| tree(repository, root)).collect()
}

/// Runs the food-groups command.
pub fn list(repository: &mut Repository, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let groups = forest(repository)?;
    match format {
        "json" => print_json(&groups)?,
        _ => {
            if groups.is_empty() {
                println!("No food groups");
            }
            for group in &groups {
                print_tree(group, 0);
            }
        }
    }
    Ok(())
}

fn print_tree(group: &FoodGroupOutput, depth: usize) {
    let marker = if group.is_active { "" } else { " (inactive)" };
    let names = translations_line(&group.translations);
    if names.is_empty() {
        println!("{:indent$}{}{}", "", group.id, marker, indent = depth * 2);
    } else {
        println!("{:indent$}{} [{}]{}", "", group.id, names, marker, indent = depth * 2);
    }
    for child in &group.children {
        print_tree(child, depth + 1);
    }
}

/// Runs the add-food-group command.
pub fn add(
    repository: &mut Repository,
    parent: Option<ProxyId>,
    is_active: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let parent = match parent {
        Some(id) => Some(repository.find::<FoodGroupProxy>(id)?),
        None => None,
    };
    let group = repository.add(FoodGroupProxy::new(ProxyId::new(), parent.as_ref(), is_active))?;
    println!("{}", group.unique_id()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodwaste_testkit::{Fixture, TestStore};

    #[test]
    fn forest_nests_children() {
        let store = TestStore::memory();
        let mut repository = store.repository();
        let fixture = Fixture::seed(&mut repository);

        let groups = forest(&mut repository).unwrap();

        assert_eq!(groups.len(), 2);
        let dairy = groups
            .iter()
            .find(|g| fixture.dairy.unique_id().unwrap() == g.id)
            .unwrap();
        assert_eq!(dairy.children.len(), 1);
        assert_eq!(dairy.children[0].id, fixture.cheese.unique_id().unwrap());
        assert!(dairy.children[0].children.is_empty());
    }
}

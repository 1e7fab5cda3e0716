//! CLI command implementations.

pub mod food_groups;
pub mod food_items;
pub mod init;

use foodwaste_core::{Repository, TranslationProxy};
use foodwaste_store::{SqliteAccessor, SqliteConfig};
use serde::Serialize;
use std::path::Path;

/// Opens a repository on an existing store.
pub fn open(path: &Path) -> Result<Repository, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No database found at {:?}", path).into());
    }
    let accessor = SqliteAccessor::open(config(path))?;
    Ok(Repository::new(Box::new(accessor)))
}

fn config(path: &Path) -> SqliteConfig {
    SqliteConfig::new(path).foreign_keys(true)
}

/// A translated text.
#[derive(Debug, Serialize)]
pub struct TranslationOutput {
    /// Culture name.
    pub culture: String,
    /// Text.
    pub value: String,
}

impl From<&TranslationProxy> for TranslationOutput {
    fn from(translation: &TranslationProxy) -> Self {
        Self {
            culture: translation.translation_info.culture_name.clone(),
            value: translation.value.clone(),
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn translations_line(translations: &[TranslationOutput]) -> String {
    translations
        .iter()
        .map(|t| format!("{}: {}", t.culture, t.value))
        .collect::<Vec<_>>()
        .join(", ")
}

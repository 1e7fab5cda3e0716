//! Table layout of the FoodWaste store.
//!
//! Every table is described by a [`TableSchema`] whose first column is the
//! key. The order of `columns` is the order in which a proxy's values are
//! written and in which it reads its own row.

use foodwaste_sql::{ColumnRef, TableRef};
use foodwaste_store::MemoryAccessor;

/// Name, select alias and ordered columns of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name.
    pub name: &'static str,
    /// Alias used when the table takes part in a join.
    pub alias: &'static str,
    /// Columns, key first.
    pub columns: &'static [&'static str],
}

impl TableSchema {
    /// The key column.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.columns[0]
    }

    /// The table without alias.
    #[must_use]
    pub const fn table(&self) -> TableRef {
        TableRef::new(self.name)
    }

    /// The table with its join alias.
    #[must_use]
    pub const fn aliased(&self) -> TableRef {
        TableRef::aliased(self.name, self.alias)
    }

    /// A column qualified by the join alias.
    #[must_use]
    pub const fn col(&self, name: &'static str) -> ColumnRef {
        ColumnRef::qualified(self.alias, name)
    }

    /// All columns, unqualified.
    pub fn column_refs(&self) -> impl Iterator<Item = ColumnRef> {
        self.columns.iter().map(|c| ColumnRef::new(*c))
    }

    /// All columns, qualified by the join alias.
    pub fn qualified_refs(&self) -> impl Iterator<Item = ColumnRef> + '_ {
        self.columns.iter().map(|c| self.col(*c))
    }
}

/// Cultures translations are written in.
pub const TRANSLATION_INFOS: TableSchema = TableSchema {
    name: "TranslationInfos",
    alias: "ti",
    columns: &["TranslationInfoIdentifier", "CultureName"],
};

/// Translated texts of any translatable object.
pub const TRANSLATIONS: TableSchema = TableSchema {
    name: "Translations",
    alias: "t",
    columns: &[
        "TranslationIdentifier",
        "OfIdentifier",
        "InfoIdentifier",
        "Value",
    ],
};

/// External data providers.
pub const DATA_PROVIDERS: TableSchema = TableSchema {
    name: "DataProviders",
    alias: "dp",
    columns: &[
        "DataProviderIdentifier",
        "Name",
        "HandlesPayments",
        "DataSourceStatementIdentifier",
    ],
};

/// Keys of domain objects at data providers.
pub const FOREIGN_KEYS: TableSchema = TableSchema {
    name: "ForeignKeys",
    alias: "fk",
    columns: &[
        "ForeignKeyIdentifier",
        "DataProviderIdentifier",
        "ForeignKeyForIdentifier",
        "ForeignKeyForTypes",
        "ForeignKeyValue",
    ],
};

/// Hierarchy of food groups.
pub const FOOD_GROUPS: TableSchema = TableSchema {
    name: "FoodGroups",
    alias: "fg",
    columns: &["FoodGroupIdentifier", "ParentIdentifier", "IsActive"],
};

/// Food items.
pub const FOOD_ITEMS: TableSchema = TableSchema {
    name: "FoodItems",
    alias: "fi",
    columns: &["FoodItemIdentifier", "IsActive"],
};

/// Membership of food items in food groups.
pub const FOOD_ITEM_GROUPS: TableSchema = TableSchema {
    name: "FoodItemGroups",
    alias: "fig",
    columns: &[
        "FoodItemGroupIdentifier",
        "FoodItemIdentifier",
        "FoodGroupIdentifier",
        "IsPrimary",
    ],
};

/// System texts such as the welcome letter.
pub const STATIC_TEXTS: TableSchema = TableSchema {
    name: "StaticTexts",
    alias: "st",
    columns: &[
        "StaticTextIdentifier",
        "StaticTextType",
        "SubjectTranslationIdentifier",
        "BodyTranslationIdentifier",
    ],
};

/// Kinds of storage.
pub const STORAGE_TYPES: TableSchema = TableSchema {
    name: "StorageTypes",
    alias: "stt",
    columns: &[
        "StorageTypeIdentifier",
        "SortOrder",
        "Temperature",
        "TemperatureRangeStartValue",
        "TemperatureRangeEndValue",
        "Creatable",
        "Editable",
        "Deletable",
    ],
};

/// Households.
pub const HOUSEHOLDS: TableSchema = TableSchema {
    name: "Households",
    alias: "h",
    columns: &["HouseholdIdentifier", "Name", "Descr", "CreationTime"],
};

/// Storages of a household.
pub const STORAGES: TableSchema = TableSchema {
    name: "Storages",
    alias: "s",
    columns: &[
        "StorageIdentifier",
        "HouseholdIdentifier",
        "SortOrder",
        "StorageTypeIdentifier",
        "Descr",
        "Temperature",
        "CreationTime",
    ],
};

/// Household members.
pub const HOUSEHOLD_MEMBERS: TableSchema = TableSchema {
    name: "HouseholdMembers",
    alias: "hm",
    columns: &[
        "HouseholdMemberIdentifier",
        "MailAddress",
        "Membership",
        "CreationTime",
    ],
};

/// Membership of household members in households.
pub const MEMBER_OF_HOUSEHOLDS: TableSchema = TableSchema {
    name: "MemberOfHouseholds",
    alias: "moh",
    columns: &[
        "MemberOfHouseholdIdentifier",
        "HouseholdMemberIdentifier",
        "HouseholdIdentifier",
        "CreationTime",
    ],
};

/// Every table, in creation order.
pub const ALL_TABLES: &[TableSchema] = &[
    TRANSLATION_INFOS,
    TRANSLATIONS,
    DATA_PROVIDERS,
    FOREIGN_KEYS,
    FOOD_GROUPS,
    FOOD_ITEMS,
    FOOD_ITEM_GROUPS,
    STATIC_TEXTS,
    STORAGE_TYPES,
    HOUSEHOLDS,
    STORAGES,
    HOUSEHOLD_MEMBERS,
    MEMBER_OF_HOUSEHOLDS,
];

/// SQLite DDL creating every table.
///
/// Translation and foreign key owners are polymorphic and carry no
/// reference constraint.
pub const SQLITE_SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS TranslationInfos (
    TranslationInfoIdentifier CHAR(36) NOT NULL PRIMARY KEY,
    CultureName CHAR(5) NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS Translations (
    TranslationIdentifier CHAR(36) NOT NULL PRIMARY KEY,
    OfIdentifier CHAR(36) NOT NULL,
    InfoIdentifier CHAR(36) NOT NULL REFERENCES TranslationInfos (TranslationInfoIdentifier),
    Value TEXT NOT NULL,
    UNIQUE (OfIdentifier, InfoIdentifier)
);
CREATE TABLE IF NOT EXISTS DataProviders (
    DataProviderIdentifier CHAR(36) NOT NULL PRIMARY KEY,
    Name VARCHAR(256) NOT NULL UNIQUE,
    HandlesPayments INTEGER NOT NULL,
    DataSourceStatementIdentifier CHAR(36) NOT NULL
);
CREATE TABLE IF NOT EXISTS ForeignKeys (
    ForeignKeyIdentifier CHAR(36) NOT NULL PRIMARY KEY,
    DataProviderIdentifier CHAR(36) NOT NULL REFERENCES DataProviders (DataProviderIdentifier),
    ForeignKeyForIdentifier CHAR(36) NOT NULL,
    ForeignKeyForTypes VARCHAR(128) NOT NULL,
    ForeignKeyValue VARCHAR(128) NOT NULL
);
CREATE TABLE IF NOT EXISTS FoodGroups (
    FoodGroupIdentifier CHAR(36) NOT NULL PRIMARY KEY,
    ParentIdentifier CHAR(36) NULL REFERENCES FoodGroups (FoodGroupIdentifier),
    IsActive INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS FoodItems (
    FoodItemIdentifier CHAR(36) NOT NULL PRIMARY KEY,
    IsActive INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS FoodItemGroups (
    FoodItemGroupIdentifier CHAR(36) NOT NULL PRIMARY KEY,
    FoodItemIdentifier CHAR(36) NOT NULL REFERENCES FoodItems (FoodItemIdentifier),
    FoodGroupIdentifier CHAR(36) NOT NULL REFERENCES FoodGroups (FoodGroupIdentifier),
    IsPrimary INTEGER NOT NULL,
    UNIQUE (FoodItemIdentifier, FoodGroupIdentifier)
);
CREATE TABLE IF NOT EXISTS StaticTexts (
    StaticTextIdentifier CHAR(36) NOT NULL PRIMARY KEY,
    StaticTextType INTEGER NOT NULL UNIQUE,
    SubjectTranslationIdentifier CHAR(36) NOT NULL,
    BodyTranslationIdentifier CHAR(36) NULL
);
CREATE TABLE IF NOT EXISTS StorageTypes (
    StorageTypeIdentifier CHAR(36) NOT NULL PRIMARY KEY,
    SortOrder INTEGER NOT NULL,
    Temperature INTEGER NOT NULL,
    TemperatureRangeStartValue INTEGER NOT NULL,
    TemperatureRangeEndValue INTEGER NOT NULL,
    Creatable INTEGER NOT NULL,
    Editable INTEGER NOT NULL,
    Deletable INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS Households (
    HouseholdIdentifier CHAR(36) NOT NULL PRIMARY KEY,
    Name VARCHAR(64) NOT NULL,
    Descr VARCHAR(2048) NULL,
    CreationTime DATETIME NOT NULL
);
CREATE TABLE IF NOT EXISTS Storages (
    StorageIdentifier CHAR(36) NOT NULL PRIMARY KEY,
    HouseholdIdentifier CHAR(36) NOT NULL REFERENCES Households (HouseholdIdentifier),
    SortOrder INTEGER NOT NULL,
    StorageTypeIdentifier CHAR(36) NOT NULL REFERENCES StorageTypes (StorageTypeIdentifier),
    Descr VARCHAR(2048) NULL,
    Temperature INTEGER NOT NULL,
    CreationTime DATETIME NOT NULL
);
CREATE TABLE IF NOT EXISTS HouseholdMembers (
    HouseholdMemberIdentifier CHAR(36) NOT NULL PRIMARY KEY,
    MailAddress VARCHAR(128) NOT NULL UNIQUE,
    Membership INTEGER NOT NULL,
    CreationTime DATETIME NOT NULL
);
CREATE TABLE IF NOT EXISTS MemberOfHouseholds (
    MemberOfHouseholdIdentifier CHAR(36) NOT NULL PRIMARY KEY,
    HouseholdMemberIdentifier CHAR(36) NOT NULL REFERENCES HouseholdMembers (HouseholdMemberIdentifier),
    HouseholdIdentifier CHAR(36) NOT NULL REFERENCES Households (HouseholdIdentifier),
    CreationTime DATETIME NOT NULL,
    UNIQUE (HouseholdMemberIdentifier, HouseholdIdentifier)
);
";

/// Declares every table in an in-memory store.
pub fn create_memory_tables(store: &MemoryAccessor) {
    for table in ALL_TABLES {
        store.create_table(table.name, table.columns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_named_after_their_table() {
        for table in ALL_TABLES {
            assert!(table.key().ends_with("Identifier"), "{}", table.name);
        }
    }

    #[test]
    fn aliases_are_unique() {
        let aliases: HashSet<_> = ALL_TABLES.iter().map(|t| t.alias).collect();
        assert_eq!(aliases.len(), ALL_TABLES.len());
    }

    #[test]
    fn ddl_names_every_table() {
        for table in ALL_TABLES {
            assert!(
                SQLITE_SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table.name)),
                "{}",
                table.name
            );
        }
    }

    #[test]
    fn memory_tables_are_declared() {
        let store = MemoryAccessor::new();
        create_memory_tables(&store);
        assert_eq!(store.row_count("FoodItems"), 0);
        assert!(store.rows("FoodItemGroups").is_empty());
    }
}

//! Test stores and seeded data.
//!
//! Fixtures panic on setup failure; they are only meant for tests.

use chrono::{TimeZone, Utc};
use foodwaste_core::schema::{create_memory_tables, SQLITE_SCHEMA};
use foodwaste_core::{
    DataProviderProxy, DataProxy, FoodGroupProxy, ProxyId, Repository, StorageTypeProxy,
    TemperatureRange, TranslationInfoProxy, TranslationProxy,
};
use foodwaste_store::{DataAccessor, MemoryAccessor, SqliteAccessor, SqliteConfig};
use std::path::PathBuf;
use tempfile::TempDir;

/// A store with every table created, cleaned up on drop.
pub struct TestStore {
    memory: Option<MemoryAccessor>,
    sqlite: Option<SqliteConfig>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates an in-memory store.
    pub fn memory() -> Self {
        let store = MemoryAccessor::new();
        create_memory_tables(&store);
        Self {
            memory: Some(store),
            sqlite: None,
            _temp_dir: None,
        }
    }

    /// Creates a SQLite store in a temporary directory, with foreign keys
    /// enforced.
    pub fn sqlite() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = SqliteConfig::new(temp_dir.path().join("foodwaste.db")).foreign_keys(true);
        let accessor = SqliteAccessor::open(config.clone()).expect("Failed to open SQLite store");
        accessor
            .execute_script(SQLITE_SCHEMA)
            .expect("Failed to create schema");
        Self {
            memory: None,
            sqlite: Some(config),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Opens a primary session on the store.
    pub fn accessor(&self) -> Box<dyn DataAccessor> {
        match (&self.memory, &self.sqlite) {
            (Some(memory), _) => Box::new(memory.clone()),
            (None, Some(config)) => {
                Box::new(SqliteAccessor::open(config.clone()).expect("Failed to open SQLite store"))
            }
            (None, None) => unreachable!("test store without backend"),
        }
    }

    /// Creates a repository on a new primary session.
    pub fn repository(&self) -> Repository {
        Repository::new(self.accessor())
    }

    /// The in-memory store, for inspecting its journal.
    pub fn journal(&self) -> Option<&MemoryAccessor> {
        self.memory.as_ref()
    }

    /// Returns the database path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self.sqlite.as_ref().map(|c| c.path.clone())
    }
}

/// Reference data and a small food group hierarchy.
///
/// Groups: `dairy` and `bakery` are roots, `cheese` is a child of `dairy`.
#[derive(Debug, Clone)]
pub struct Fixture {
    /// `da-DK`.
    pub danish: TranslationInfoProxy,
    /// `en-US`.
    pub english: TranslationInfoProxy,
    /// A data provider with a translated data source statement.
    pub provider: DataProviderProxy,
    /// Root group.
    pub dairy: FoodGroupProxy,
    /// Child of `dairy`.
    pub cheese: FoodGroupProxy,
    /// Root group.
    pub bakery: FoodGroupProxy,
    /// A refrigerator storage type.
    pub refrigerator: StorageTypeProxy,
}

impl Fixture {
    /// Writes the fixture through `repository` and returns the stored proxies.
    pub fn seed(repository: &mut Repository) -> Self {
        let danish = TranslationInfoProxy::new(ProxyId::new(), "da-DK");
        let english = TranslationInfoProxy::new(ProxyId::new(), "en-US");
        repository.seed(&danish).expect("Failed to seed culture");
        repository.seed(&english).expect("Failed to seed culture");

        let refrigerator = StorageTypeProxy::new(
            ProxyId::new(),
            1,
            5,
            TemperatureRange::new(2, 8),
            true,
            true,
            true,
        );
        repository.seed(&refrigerator).expect("Failed to seed storage type");

        let mut provider = DataProviderProxy::new(ProxyId::new(), "Provider", false, ProxyId::new());
        provider
            .data_source_statements
            .push(translation(&english, "Data from Provider"));
        let provider = repository.add(provider).expect("Failed to add data provider");

        let dairy = repository
            .add(FoodGroupProxy::new(ProxyId::new(), None, true))
            .expect("Failed to add food group");
        let cheese = repository
            .add(FoodGroupProxy::new(ProxyId::new(), Some(&dairy), true))
            .expect("Failed to add food group");
        let bakery = repository
            .add(FoodGroupProxy::new(ProxyId::new(), None, true))
            .expect("Failed to add food group");

        Self {
            danish,
            english,
            provider,
            dairy,
            cheese,
            bakery,
            refrigerator,
        }
    }
}

/// A translation in `culture`, owner assigned on save.
pub fn translation(culture: &TranslationInfoProxy, value: &str) -> TranslationProxy {
    TranslationProxy::new(None, None, culture.clone(), value)
}

/// A fixed creation time.
pub fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0)
        .single()
        .expect("valid time")
}

/// Identifier with every byte set to `byte`.
pub fn repeated_id(byte: u8) -> ProxyId {
    ProxyId::from_bytes([byte; 16])
}

/// Identifier of `proxy`, which must have one.
pub fn id_of<P: DataProxy>(proxy: &P) -> ProxyId {
    proxy.identifier().expect("proxy without identifier")
}

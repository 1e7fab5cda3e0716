//! Aggregate-level operations over an accessor.

use crate::config::EngineConfig;
use crate::error::{CoreError, CoreResult};
use crate::identity::ProxyId;
use crate::proxy::{
    ensure_mutable, DataProviderProxy, DataProxy, FoodGroupProxy, FoodItemProxy, HouseholdMemberProxy,
    HouseholdProxy, StaticTextProxy, StorageTypeProxy, TranslationInfoProxy,
};
use foodwaste_sql::Statement;
use foodwaste_store::{DataAccessor, DataReader};
use tracing::{debug, info};

/// Reads and writes whole aggregates.
///
/// The repository owns the primary accessor session. Every relation query
/// and relation write issued on behalf of an aggregate runs on a clone of
/// that session.
///
/// # Example
///
/// ```rust
/// use foodwaste_core::{schema, DataProxy, FoodGroupProxy, ProxyId, Repository};
/// use foodwaste_store::MemoryAccessor;
///
/// let store = MemoryAccessor::new();
/// schema::create_memory_tables(&store);
/// let mut repository = Repository::new(Box::new(store));
///
/// let group = repository.add(FoodGroupProxy::new(ProxyId::new(), None, true)).unwrap();
/// let roots = repository.root_food_groups().unwrap();
/// assert_eq!(roots.len(), 1);
/// assert_eq!(roots[0].identifier(), group.identifier());
/// ```
pub struct Repository {
    accessor: Box<dyn DataAccessor>,
    config: EngineConfig,
}

impl Repository {
    /// Creates a repository with default configuration.
    #[must_use]
    pub fn new(accessor: Box<dyn DataAccessor>) -> Self {
        Self::with_config(accessor, EngineConfig::default())
    }

    /// Creates a repository with the given configuration.
    #[must_use]
    pub fn with_config(accessor: Box<dyn DataAccessor>, config: EngineConfig) -> Self {
        Self { accessor, config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the primary accessor session.
    #[must_use]
    pub fn accessor(&self) -> &dyn DataAccessor {
        &*self.accessor
    }

    /// Reads the aggregate identified by `query`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if no row has the key.
    pub fn get<P: DataProxy>(&mut self, query: &P) -> CoreResult<P> {
        let statement = query.build_select()?;
        let mut reader = self.accessor.query(&statement)?;
        if !reader.read() {
            return Err(CoreError::not_found(P::SCHEMA.name, query.unique_id()?));
        }
        let accessor = &*self.accessor;
        if self.config.eager_relations {
            query.create(&reader, accessor, &[])
        } else {
            let mut proxy = P::default();
            proxy.map_data(&reader, accessor)?;
            Ok(proxy)
        }
    }

    /// Reads the aggregate with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if no row has the key.
    pub fn find<P: DataProxy>(&mut self, id: ProxyId) -> CoreResult<P> {
        self.get(&P::keyed(id))
    }

    /// Reads every aggregate `statement` selects.
    ///
    /// All rows are mapped before any relation is loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a row cannot be mapped.
    pub fn get_collection<P: DataProxy>(&mut self, statement: &Statement) -> CoreResult<Vec<P>> {
        let mut reader = self.accessor.query(statement)?;
        let accessor = &*self.accessor;
        let mut proxies = Vec::with_capacity(reader.len());
        while reader.read() {
            let mut proxy = P::default();
            proxy.map_data(&reader, accessor)?;
            proxies.push(proxy);
        }
        if self.config.eager_relations {
            for proxy in &mut proxies {
                proxy.map_relations(accessor)?;
            }
        }
        debug!(proxy = P::NAME, count = proxies.len(), "collection read");
        Ok(proxies)
    }

    /// Inserts the aggregate and its relations, then reads it back.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Unsupported`] for reference data,
    /// [`CoreError::RelationsNotLoaded`] for relation edits on a lazily read
    /// proxy and [`CoreError::IllegalValue`] for a missing key. All are
    /// raised before any statement runs.
    pub fn add<P: DataProxy>(&mut self, mut proxy: P) -> CoreResult<P> {
        ensure_mutable::<P>("Add")?;
        proxy.ensure_relations_loaded()?;
        if proxy.identifier().is_none() && self.config.assign_identifiers {
            proxy.set_identifier(ProxyId::new());
        }
        proxy.validate_relations()?;
        let insert = proxy.build_insert()?;
        self.accessor.execute(&insert)?;
        proxy.save_relations(&*self.accessor, true)?;
        info!(proxy = P::NAME, id = %proxy.unique_id()?, "aggregate added");
        self.get(&proxy)
    }

    /// Updates the aggregate and its relations, then reads it back.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the row does not exist and
    /// writes are verified. Relation edits on a proxy read without its
    /// relations fail with [`CoreError::RelationsNotLoaded`] before the row
    /// is written; call [`DataProxy::map_relations`] before editing.
    pub fn save<P: DataProxy>(&mut self, mut proxy: P) -> CoreResult<P> {
        ensure_mutable::<P>("Save")?;
        proxy.ensure_relations_loaded()?;
        proxy.validate_relations()?;
        let update = proxy.build_update()?;
        let affected = self.accessor.execute(&update)?;
        if affected == 0 && self.config.verify_writes {
            return Err(CoreError::not_found(P::SCHEMA.name, proxy.unique_id()?));
        }
        proxy.save_relations(&*self.accessor, false)?;
        info!(proxy = P::NAME, id = %proxy.unique_id()?, "aggregate saved");
        self.get(&proxy)
    }

    /// Deletes the aggregate's dependent rows, then its own row.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the row does not exist and
    /// writes are verified.
    pub fn delete<P: DataProxy>(&mut self, mut proxy: P) -> CoreResult<()> {
        ensure_mutable::<P>("Delete")?;
        let delete = proxy.build_delete()?;
        proxy.delete_relations(&*self.accessor)?;
        let affected = self.accessor.execute(&delete)?;
        if affected == 0 && self.config.verify_writes {
            return Err(CoreError::not_found(P::SCHEMA.name, proxy.unique_id()?));
        }
        info!(proxy = P::NAME, id = %proxy.unique_id()?, "aggregate deleted");
        Ok(())
    }

    /// Inserts only the proxy's own row. Used to load reference data.
    ///
    /// # Errors
    ///
    /// Returns an error if a key is missing or the insert fails.
    pub fn seed<P: DataProxy>(&mut self, proxy: &P) -> CoreResult<()> {
        self.accessor.execute(&proxy.build_insert()?)?;
        debug!(proxy = P::NAME, id = %proxy.unique_id()?, "row seeded");
        Ok(())
    }

    /// Food groups without a parent.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn root_food_groups(&mut self) -> CoreResult<Vec<FoodGroupProxy>> {
        self.get_collection(&FoodGroupProxy::select_roots())
    }

    /// Food items that belong to `food_group`.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn food_items_in_group(&mut self, food_group: ProxyId) -> CoreResult<Vec<FoodItemProxy>> {
        self.get_collection(&FoodItemProxy::select_for_group(&food_group.to_key()))
    }

    /// Households `household_member` belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the member does not exist.
    pub fn households_of(&mut self, household_member: ProxyId) -> CoreResult<Vec<HouseholdProxy>> {
        let member: HouseholdMemberProxy = self.find(household_member)?;
        let mut households = if member.state().has_relations() {
            member.households
        } else {
            let mut member = member;
            member.map_relations(&*self.accessor)?;
            member.households
        };
        if self.config.eager_relations {
            for household in &mut households {
                household.map_relations(&*self.accessor)?;
            }
        }
        Ok(households)
    }

    /// Every culture translations exist in.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn translation_infos(&mut self) -> CoreResult<Vec<TranslationInfoProxy>> {
        self.get_collection(&TranslationInfoProxy::select_all())
    }

    /// Every data provider.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn data_providers(&mut self) -> CoreResult<Vec<DataProviderProxy>> {
        self.get_collection(&DataProviderProxy::select_all())
    }

    /// The static text of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if no text has the type.
    pub fn static_text(&mut self, static_text_type: i32) -> CoreResult<StaticTextProxy> {
        self.get_collection(&StaticTextProxy::select_by_type(static_text_type))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                CoreError::not_found(StaticTextProxy::SCHEMA.name, static_text_type.to_string())
            })
    }

    /// Every storage type.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn storage_types(&mut self) -> CoreResult<Vec<StorageTypeProxy>> {
        self.get_collection(&StorageTypeProxy::select_all())
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("session", &self.accessor.session_id())
            .field("config", &self.config)
            .finish()
    }
}

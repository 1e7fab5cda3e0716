//! Engine configuration.

/// Configuration for a [`crate::Repository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Load relations when a proxy is read through the repository.
    ///
    /// When disabled, reads stop after the scalar columns and relations
    /// are loaded on demand by `map_relations` or the next save.
    pub eager_relations: bool,
    /// Fail a save or delete whose row statement matched no stored row.
    pub verify_writes: bool,
    /// Assign a fresh identifier to proxies added without one.
    pub assign_identifiers: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            eager_relations: true,
            verify_writes: true,
            assign_identifiers: true,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets eager relation loading.
    #[must_use]
    pub const fn eager_relations(mut self, enabled: bool) -> Self {
        self.eager_relations = enabled;
        self
    }

    /// Sets write verification.
    #[must_use]
    pub const fn verify_writes(mut self, enabled: bool) -> Self {
        self.verify_writes = enabled;
        self
    }

    /// Sets identifier assignment on add.
    #[must_use]
    pub const fn assign_identifiers(mut self, enabled: bool) -> Self {
        self.assign_identifiers = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert!(config.eager_relations);
        assert!(config.verify_writes);
        assert!(config.assign_identifiers);
    }

    #[test]
    fn builder_pattern() {
        let config = EngineConfig::new()
            .eager_relations(false)
            .verify_writes(false);
        assert!(!config.eager_relations);
        assert!(!config.verify_writes);
        assert!(config.assign_identifiers);
    }
}

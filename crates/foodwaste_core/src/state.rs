//! Hydration state of a proxy.

use std::fmt;

/// How much of an aggregate has been loaded from the store.
///
/// A proxy read from a cursor moves `Unpopulated -> ScalarsLoaded` when its
/// own columns are mapped and `ScalarsLoaded -> RelationsLoaded` when its
/// related objects are fetched. Proxies constructed by the application start
/// in `RelationsLoaded`: their relations are whatever the caller assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum HydrationState {
    /// Nothing loaded.
    #[default]
    Unpopulated,
    /// Own columns loaded, relations not yet fetched.
    ScalarsLoaded,
    /// Own columns and relations loaded.
    RelationsLoaded,
}

impl HydrationState {
    /// Whether the proxy's own columns hold stored or assigned values.
    #[must_use]
    pub const fn has_scalars(self) -> bool {
        !matches!(self, Self::Unpopulated)
    }

    /// Whether the proxy's relation collections are authoritative.
    #[must_use]
    pub const fn has_relations(self) -> bool {
        matches!(self, Self::RelationsLoaded)
    }
}

impl fmt::Display for HydrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unpopulated => "unpopulated",
            Self::ScalarsLoaded => "scalars-loaded",
            Self::RelationsLoaded => "relations-loaded",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_loading() {
        assert!(HydrationState::Unpopulated < HydrationState::ScalarsLoaded);
        assert!(HydrationState::ScalarsLoaded < HydrationState::RelationsLoaded);
        assert!(!HydrationState::default().has_scalars());
        assert!(HydrationState::RelationsLoaded.has_scalars());
        assert!(!HydrationState::ScalarsLoaded.has_relations());
    }
}

//! Proxy identifiers and their canonical key form.

use crate::error::{CoreError, CoreResult};
use foodwaste_sql::SqlValue;
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a proxy.
///
/// Identifiers are 128-bit UUIDs. In statement text and key columns they
/// appear in canonical form: upper case, hyphenated 8-4-4-4-12.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProxyId(Uuid);

impl ProxyId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Creates an identifier from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Converts to a UUID.
    #[must_use]
    pub const fn to_uuid(&self) -> Uuid {
        self.0
    }

    /// Returns the canonical key string.
    #[must_use]
    pub fn to_key(&self) -> String {
        format!("{:X}", self.0.hyphenated())
    }

    /// Parses a key string. Any case is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidKey`] if `key` is not a hyphenated UUID.
    pub fn parse_key(key: &str) -> CoreResult<Self> {
        Uuid::try_parse(key.trim())
            .map(Self)
            .map_err(|_| CoreError::InvalidKey {
                value: key.to_string(),
            })
    }
}

impl Default for ProxyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProxyId({})", self.to_key())
    }
}

impl fmt::Display for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key())
    }
}

impl From<Uuid> for ProxyId {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl From<ProxyId> for Uuid {
    fn from(id: ProxyId) -> Self {
        id.to_uuid()
    }
}

impl From<ProxyId> for SqlValue {
    fn from(id: ProxyId) -> Self {
        SqlValue::Text(id.to_key())
    }
}

/// Formats an optional identifier as a canonical key.
///
/// # Errors
///
/// Returns [`CoreError::IllegalValue`] naming `field` if `id` is absent.
pub fn format_key(id: Option<ProxyId>, field: &str) -> CoreResult<String> {
    require_id(id, field).map(|id| id.to_key())
}

/// Unwraps an optional identifier.
///
/// # Errors
///
/// Returns [`CoreError::IllegalValue`] naming `field` if `id` is absent.
pub fn require_id(id: Option<ProxyId>, field: &str) -> CoreResult<ProxyId> {
    id.ok_or_else(|| CoreError::illegal_value(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_is_upper_case_and_hyphenated() {
        let id = ProxyId::parse_key("a1b2c3d4-e5f6-0718-293a-4b5c6d7e8f90").unwrap();
        assert_eq!(id.to_key(), "A1B2C3D4-E5F6-0718-293A-4B5C6D7E8F90");
    }

    #[test]
    fn key_is_stable() {
        let id = ProxyId::new();
        assert_eq!(id.to_key(), id.to_key());
        assert_eq!(ProxyId::parse_key(&id.to_key()).unwrap(), id);
    }

    #[test]
    fn absent_identifier_is_illegal() {
        let err = format_key(None, "Identifier").unwrap_err();
        assert_eq!(err.illegal_field(), Some("Identifier"));
    }

    #[test]
    fn invalid_key_text() {
        assert!(matches!(
            ProxyId::parse_key("not-a-key"),
            Err(CoreError::InvalidKey { .. })
        ));
    }

    #[test]
    fn sql_value_is_canonical_text() {
        let id = ProxyId::from_bytes([0x11; 16]);
        assert_eq!(
            SqlValue::from(id),
            SqlValue::text("11111111-1111-1111-1111-111111111111")
        );
    }

    #[test]
    fn new_is_unique() {
        assert_ne!(ProxyId::new(), ProxyId::new());
    }
}

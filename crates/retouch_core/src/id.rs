//! Unique identifiers for retouch entities.
//!
//! All IDs are UUIDs. Asset IDs may also be derived from a name so that
//! scripted sessions can refer to assets by a readable key.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Action identifier - identifies a single logged action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(Uuid);

impl ActionId {
    /// Create a new random ActionId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "act_{}", self.0)
    }
}

/// Asset identifier - identifies a registered source image
///
/// Serialized as a hyphenated UUID string. Deserializing a string that is
/// not a UUID derives a name-based (v5) id from it instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AssetId(Uuid);

impl AssetId {
    /// Create a new random AssetId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from name (for named assets)
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for AssetId {
    fn from(value: String) -> Self {
        match Uuid::parse_str(&value) {
            Ok(uuid) => Self(uuid),
            Err(_) => Self::from_name(&value),
        }
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0.hyphenated().to_string()
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "asset_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_id_unique() {
        let id1 = ActionId::new();
        let id2 = ActionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_action_id_display() {
        let id = ActionId::new();
        assert!(id.to_string().starts_with("act_"));
    }

    #[test]
    fn test_asset_id_from_name_stable() {
        let id1 = AssetId::from_name("front.png");
        let id2 = AssetId::from_name("front.png");
        assert_eq!(id1, id2);
        assert_ne!(id1, AssetId::from_name("back.png"));
    }

    #[test]
    fn test_asset_id_serde_uuid_roundtrip() {
        let id = AssetId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: AssetId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_asset_id_deserialize_name() {
        let id: AssetId = serde_json::from_str("\"front\"").unwrap();
        assert_eq!(id, AssetId::from_name("front"));
    }
}

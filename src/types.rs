use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::matcher::intersection::shared_attribute_count;

/// Opaque entity identifier. Integer ids are kept in their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// A device (or any other entity) and the set of attribute tokens it carries.
///
/// The attribute set is fixed at construction; duplicate tokens collapse and
/// input order is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    attributes: AHashSet<String>,
}

impl Entity {
    pub fn new<I, S>(id: impl Into<EntityId>, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds an entity from an optional attribute collection; `None` is an empty set.
    pub fn from_optional<I, S>(id: impl Into<EntityId>, attributes: Option<I>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match attributes {
            Some(attributes) => Self::new(id, attributes),
            None => Self::without_attributes(id),
        }
    }

    pub fn without_attributes(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            attributes: AHashSet::new(),
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn attributes(&self) -> &AHashSet<String> {
        &self.attributes
    }

    pub fn has_attribute(&self, token: &str) -> bool {
        self.attributes.contains(token)
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn key(&self) -> AttributeSetKey {
        AttributeSetKey::from_set(&self.attributes)
    }

    /// Number of attribute tokens this entity shares with `other`.
    pub fn shared_with(&self, other: &Entity) -> usize {
        shared_attribute_count(&self.attributes, &other.attributes)
    }
}

/// Canonical form of an attribute set: distinct tokens in byte order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSetKey(Vec<String>);

impl AttributeSetKey {
    pub fn from_set(attributes: &AHashSet<String>) -> Self {
        let mut tokens: Vec<String> = attributes.iter().cloned().collect();
        tokens.sort_unstable();
        Self(tokens)
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AttributeSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0.join(", "))
    }
}

/// Two entities, in input order, and the number of attributes they share.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimilarityPair {
    pub first: EntityId,
    pub second: EntityId,
    pub shared: usize,
}

impl SimilarityPair {
    pub fn ids(&self) -> (&EntityId, &EntityId) {
        (&self.first, &self.second)
    }
}

/// Entities whose attribute sets are identical. Always has at least two members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub attributes: AttributeSetKey,
    pub members: Vec<EntityId>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.members.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_tokens_collapse() {
        let entity = Entity::new("Device1", ["WiFi", "WiFi", "GPS"]);
        assert_eq!(entity.attribute_count(), 2);
        assert!(entity.has_attribute("WiFi"));
    }

    #[test]
    fn key_ignores_input_order() {
        let a = Entity::new("a", ["WiFi", "Bluetooth", "GPS"]);
        let b = Entity::new("b", ["GPS", "WiFi", "Bluetooth", "GPS"]);
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().tokens(), ["Bluetooth", "GPS", "WiFi"]);
    }

    #[test]
    fn key_is_case_sensitive() {
        let a = Entity::new("a", ["wifi"]);
        let b = Entity::new("b", ["WiFi"]);
        let c = Entity::new("c", [" WiFi"]);
        assert_ne!(a.key(), b.key());
        assert_ne!(b.key(), c.key());
    }

    #[test]
    fn missing_attributes_are_empty() {
        let entity = Entity::from_optional("x", None::<Vec<String>>);
        assert_eq!(entity.attribute_count(), 0);
        assert!(entity.key().is_empty());
        assert_eq!(entity.key(), Entity::new("y", Vec::<String>::new()).key());
    }

    #[test]
    fn integer_ids_display_as_decimal() {
        let id = EntityId::from(42u64);
        assert_eq!(id.as_str(), "42");
        assert_eq!(id, EntityId::from("42"));
    }

    #[test]
    fn key_display_lists_tokens() {
        let entity = Entity::new("a", ["WiFi", "GPS"]);
        assert_eq!(entity.key().to_string(), "{GPS, WiFi}");
    }
}

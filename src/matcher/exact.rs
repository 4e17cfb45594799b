// src/matcher/exact.rs
use ahash::AHashMap;
use log::{debug, trace};

use crate::error::{Error, Result};
use crate::types::{AttributeSetKey, Entity, EntityId, Group};
use super::validate_unique_ids;

pub const MIN_GROUP_SIZE: usize = 2;

/// Index from canonical attribute set to the ids that carry it.
///
/// Buckets keep ids in insertion order and keys in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct AttributeIndex {
    slots: AHashMap<AttributeSetKey, usize>,
    buckets: Vec<(AttributeSetKey, Vec<EntityId>)>,
}

impl AttributeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build<'a, I>(entities: I) -> Self
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let mut index = Self::new();
        for entity in entities {
            index.insert(entity.key(), entity.id().clone());
        }
        index
    }

    pub fn insert(&mut self, key: AttributeSetKey, id: EntityId) {
        trace!("Indexing {} under {}", id, key);
        match self.slots.get(&key) {
            Some(&slot) => self.buckets[slot].1.push(id),
            None => {
                self.slots.insert(key.clone(), self.buckets.len());
                self.buckets.push((key, vec![id]));
            }
        }
    }

    /// Appends every bucket of `other` after this index's contents.
    ///
    /// Merging sub-indexes built over consecutive chunks of the input, left to
    /// right, gives the same index as a single sequential build.
    pub fn merge(&mut self, other: AttributeIndex) {
        for (key, ids) in other.buckets {
            match self.slots.get(&key) {
                Some(&slot) => self.buckets[slot].1.extend(ids),
                None => {
                    self.slots.insert(key.clone(), self.buckets.len());
                    self.buckets.push((key, ids));
                }
            }
        }
    }

    pub fn key_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn into_groups(self, min_group_size: usize) -> Groups {
        Groups {
            buckets: self.buckets.into_iter(),
            min_group_size,
        }
    }
}

/// Lazy sequence of groups, in the order their attribute sets first appeared.
#[derive(Debug)]
pub struct Groups {
    buckets: std::vec::IntoIter<(AttributeSetKey, Vec<EntityId>)>,
    min_group_size: usize,
}

impl Iterator for Groups {
    type Item = Group;

    fn next(&mut self) -> Option<Group> {
        let min = self.min_group_size;
        self.buckets
            .by_ref()
            .find(|(_, members)| members.len() >= min)
            .map(|(attributes, members)| Group { attributes, members })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.buckets.len()))
    }
}

/// Groups entities whose attribute sets are exactly equal.
#[derive(Debug, Clone)]
pub struct ExactMatchGrouper {
    min_group_size: usize,
}

impl Default for ExactMatchGrouper {
    fn default() -> Self {
        Self { min_group_size: MIN_GROUP_SIZE }
    }
}

impl ExactMatchGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_group_size(min_group_size: usize) -> Result<Self> {
        if min_group_size < MIN_GROUP_SIZE {
            return Err(Error::invalid_argument(format!(
                "min_group_size must be at least {}, got {}",
                MIN_GROUP_SIZE, min_group_size
            )));
        }
        Ok(Self { min_group_size })
    }

    pub fn min_group_size(&self) -> usize {
        self.min_group_size
    }

    pub fn group(&self, entities: &[Entity]) -> Result<Groups> {
        validate_unique_ids(entities)?;

        let index = AttributeIndex::build(entities);
        debug!(
            "Indexed {} entities under {} distinct attribute sets",
            entities.len(),
            index.key_count()
        );

        Ok(index.into_groups(self.min_group_size))
    }
}

/// Groups of two or more entities sharing an identical attribute set.
pub fn group_by_exact_attributes(entities: &[Entity]) -> Result<Groups> {
    ExactMatchGrouper::new().group(entities)
}

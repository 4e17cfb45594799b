// src/matcher/threshold.rs
use log::{debug, trace};

use crate::error::{Error, Result};
use crate::types::{Entity, SimilarityPair};
use super::validate_unique_ids;

/// Number of unordered pairs over `n` entities.
pub fn pair_count(n: usize) -> usize {
    n.saturating_mul(n.saturating_sub(1)) / 2
}

/// Validates a caller-supplied threshold and converts it to a count.
pub fn checked_threshold(threshold: i64) -> Result<usize> {
    usize::try_from(threshold).map_err(|_| {
        Error::invalid_argument(format!("threshold must be >= 0, got {}", threshold))
    })
}

/// Emits a pair only if its shared count reaches the threshold.
#[inline]
pub(crate) fn evaluate_pair(a: &Entity, b: &Entity, threshold: usize) -> Option<SimilarityPair> {
    let shared = a.shared_with(b);
    trace!("{} ~ {}: {} shared", a.id(), b.id(), shared);
    (shared >= threshold).then(|| SimilarityPair {
        first: a.id().clone(),
        second: b.id().clone(),
        shared,
    })
}

/// Pairwise shared-attribute matcher.
///
/// Every unordered pair is compared, so a run costs O(n² · a). There is no
/// exact sub-quadratic alternative for general thresholds; use
/// [`ParallelMatcher`](super::ParallelMatcher) to spread the work for large n.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdMatcher {
    threshold: usize,
}

impl ThresholdMatcher {
    pub fn new(threshold: i64) -> Result<Self> {
        Ok(Self { threshold: checked_threshold(threshold)? })
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn pairs<'a>(&self, entities: &'a [Entity]) -> Result<SimilarityPairs<'a>> {
        validate_unique_ids(entities)?;
        debug!(
            "Comparing {} pairs over {} entities (threshold {})",
            pair_count(entities.len()),
            entities.len(),
            self.threshold
        );
        Ok(SimilarityPairs::new(entities, self.threshold))
    }
}

/// Lazy sequence of matching pairs, ordered by (i, j) in input order.
#[derive(Debug, Clone)]
pub struct SimilarityPairs<'a> {
    entities: &'a [Entity],
    threshold: usize,
    i: usize,
    j: usize,
}

impl<'a> SimilarityPairs<'a> {
    fn new(entities: &'a [Entity], threshold: usize) -> Self {
        Self { entities, threshold, i: 0, j: 1 }
    }

    fn remaining(&self) -> usize {
        let n = self.entities.len();
        if self.i >= n {
            return 0;
        }
        // rest of row i plus every later row
        n.saturating_sub(self.j) + pair_count(n - self.i - 1)
    }
}

impl<'a> Iterator for SimilarityPairs<'a> {
    type Item = SimilarityPair;

    fn next(&mut self) -> Option<SimilarityPair> {
        let n = self.entities.len();
        while self.i < n {
            if self.j >= n {
                self.i += 1;
                self.j = self.i + 1;
                continue;
            }
            let (a, b) = (&self.entities[self.i], &self.entities[self.j]);
            self.j += 1;
            if let Some(pair) = evaluate_pair(a, b, self.threshold) {
                return Some(pair);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

/// Pairs of entities sharing at least `threshold` attributes.
pub fn match_by_shared_attribute_threshold(
    entities: &[Entity],
    threshold: i64,
) -> Result<SimilarityPairs<'_>> {
    ThresholdMatcher::new(threshold)?.pairs(entities)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> Vec<Entity> {
        vec![
            Entity::new("Device1", ["WiFi", "Bluetooth", "GPS"]),
            Entity::new("Device2", ["Bluetooth", "WiFi", "GPS"]),
            Entity::new("Device3", ["WiFi", "Bluetooth"]),
            Entity::new("Device4", ["GPS", "WiFi", "Bluetooth", "NFC"]),
        ]
    }

    fn triples(pairs: SimilarityPairs<'_>) -> Vec<(String, String, usize)> {
        pairs
            .map(|p| (p.first.to_string(), p.second.to_string(), p.shared))
            .collect()
    }

    #[test]
    fn threshold_two_matches_every_device_pair() {
        let entities = devices();
        let found = triples(match_by_shared_attribute_threshold(&entities, 2).unwrap());
        let expected: Vec<(String, String, usize)> = [
            ("Device1", "Device2", 3),
            ("Device1", "Device3", 2),
            ("Device1", "Device4", 3),
            ("Device2", "Device3", 2),
            ("Device2", "Device4", 3),
            ("Device3", "Device4", 2),
        ]
        .iter()
        .map(|(a, b, n)| (a.to_string(), b.to_string(), *n))
        .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn threshold_three_drops_smaller_overlaps() {
        let entities = devices();
        let found = triples(match_by_shared_attribute_threshold(&entities, 3).unwrap());
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|(_, _, n)| *n == 3));
        assert!(found.iter().all(|(a, b, _)| a != "Device3" && b != "Device3"));
    }

    #[test]
    fn zero_threshold_includes_disjoint_pairs() {
        let entities = vec![
            Entity::new("a", ["x"]),
            Entity::new("b", ["y"]),
            Entity::without_attributes("c"),
        ];
        let found = triples(match_by_shared_attribute_threshold(&entities, 0).unwrap());
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|(_, _, n)| *n == 0));
    }

    #[test]
    fn threshold_above_largest_set_yields_nothing() {
        let entities = devices();
        assert_eq!(match_by_shared_attribute_threshold(&entities, 5).unwrap().count(), 0);
    }

    #[test]
    fn fewer_than_two_entities_yield_nothing() {
        let one = vec![Entity::new("a", ["x"])];
        assert_eq!(match_by_shared_attribute_threshold(&one, 0).unwrap().count(), 0);
        assert_eq!(match_by_shared_attribute_threshold(&[], 0).unwrap().count(), 0);
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let entities = devices();
        assert!(matches!(
            match_by_shared_attribute_threshold(&entities, -1),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected_before_matching() {
        let entities = vec![Entity::new("a", ["x"]), Entity::new("a", ["x"])];
        assert!(matches!(
            match_by_shared_attribute_threshold(&entities, 0),
            Err(Error::DuplicateEntity(_))
        ));
    }

    #[test]
    fn size_hint_bounds_remaining_pairs() {
        let entities = devices();
        let mut pairs = match_by_shared_attribute_threshold(&entities, 0).unwrap();
        assert_eq!(pairs.size_hint(), (0, Some(6)));
        pairs.next();
        assert_eq!(pairs.size_hint(), (0, Some(5)));
        assert_eq!(pairs.by_ref().count(), 5);
        assert_eq!(pairs.size_hint(), (0, Some(0)));
    }

    #[test]
    fn pair_count_handles_small_inputs() {
        assert_eq!(pair_count(0), 0);
        assert_eq!(pair_count(1), 0);
        assert_eq!(pair_count(4), 6);
    }
}

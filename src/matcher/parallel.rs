// src/matcher/parallel.rs

use indicatif::{ParallelProgressIterator, ProgressBar};
use log::{debug, info};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

use crate::config::subsystems::processor::ProcessorConfig;
use crate::error::Result;
use crate::types::{Entity, Group, SimilarityPair};
use super::exact::{AttributeIndex, ExactMatchGrouper};
use super::threshold::{checked_threshold, evaluate_pair, pair_count, ThresholdMatcher};
use super::validate_unique_ids;

// Entities per sub-index when building the exact-match index in parallel
const MIN_INDEX_CHUNK: usize = 256;

/// Runs both passes on a rayon pool.
///
/// Output is identical, element for element, to the sequential passes.
pub struct ParallelMatcher {
    config: ProcessorConfig,
    thread_pool: Option<Arc<rayon::ThreadPool>>,
    progress: Option<ProgressBar>,
}

impl ParallelMatcher {
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        config.validate()?;

        // Dedicated pool only when a thread count is configured
        let thread_pool = if config.parallel_thread_count > 0 {
            Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(config.parallel_thread_count)
                    .build()?,
            ))
        } else {
            None
        };

        Ok(Self { config, thread_pool, progress: None })
    }

    /// Reports per-row progress of the pairwise pass on `bar`.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    pub fn thread_count(&self) -> usize {
        match &self.thread_pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn install<T: Send>(&self, op: impl FnOnce() -> T + Send) -> T {
        match &self.thread_pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    fn is_small(&self, entities: &[Entity]) -> bool {
        entities.len() < self.config.min_parallel_entities
    }

    pub fn pairs(&self, entities: &[Entity], threshold: i64) -> Result<Vec<SimilarityPair>> {
        if self.is_small(entities) {
            debug!("{} entities below parallel cutoff, matching sequentially", entities.len());
            return Ok(ThresholdMatcher::new(threshold)?.pairs(entities)?.collect());
        }

        let threshold = checked_threshold(threshold)?;
        validate_unique_ids(entities)?;

        let start_time = Instant::now();
        let n = entities.len();
        info!(
            "Comparing {} pairs over {} entities on {} threads",
            pair_count(n),
            n,
            self.thread_count()
        );

        // Row i owns pairs (i, j > i); rows are contiguous ranges of the pair space.
        let row = |i: usize| -> Vec<SimilarityPair> {
            let a = &entities[i];
            entities[i + 1..]
                .iter()
                .filter_map(|b| evaluate_pair(a, b, threshold))
                .collect()
        };

        let rows: Vec<Vec<SimilarityPair>> = self.install(|| match &self.progress {
            Some(bar) => {
                bar.set_length(n as u64);
                (0..n).into_par_iter().progress_with(bar.clone()).map(row).collect()
            }
            None => (0..n).into_par_iter().map(row).collect(),
        });

        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }

        let pairs: Vec<SimilarityPair> = rows.into_iter().flatten().collect();
        info!(
            "Found {} pairs with at least {} shared attributes in {:?}",
            pairs.len(),
            threshold,
            start_time.elapsed()
        );
        Ok(pairs)
    }

    pub fn groups(&self, entities: &[Entity], min_group_size: usize) -> Result<Vec<Group>> {
        let grouper = ExactMatchGrouper::with_min_group_size(min_group_size)?;

        if self.is_small(entities) {
            debug!("{} entities below parallel cutoff, grouping sequentially", entities.len());
            return Ok(grouper.group(entities)?.collect());
        }

        validate_unique_ids(entities)?;

        let chunk_size = (entities.len() / self.thread_count().max(1)).max(MIN_INDEX_CHUNK);
        debug!("Building attribute index in chunks of {} entities", chunk_size);

        // Sub-indexes are merged left to right to keep first-seen key order.
        let index = self.install(|| {
            entities
                .par_chunks(chunk_size)
                .map(|chunk| AttributeIndex::build(chunk))
                .reduce(AttributeIndex::new, |mut left, right| {
                    left.merge(right);
                    left
                })
        });

        Ok(index.into_groups(grouper.min_group_size()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::matcher::{group_by_exact_attributes, match_by_shared_attribute_threshold};

    fn always_parallel(threads: usize) -> ParallelMatcher {
        let config = ProcessorConfig {
            parallel: true,
            parallel_thread_count: threads,
            min_parallel_entities: 0,
        };
        ParallelMatcher::new(config).unwrap()
    }

    fn fleet(n: usize) -> Vec<Entity> {
        let features = ["WiFi", "Bluetooth", "GPS", "NFC", "LTE", "USB-C"];
        (0..n)
            .map(|i| {
                let attrs = features
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| (i >> bit) & 1 == 1)
                    .map(|(_, f)| *f);
                Entity::new(format!("Device{}", i), attrs)
            })
            .collect()
    }

    #[test]
    fn parallel_pairs_match_sequential() {
        let entities = fleet(150);
        let matcher = always_parallel(4);
        for threshold in [0, 2, 4, 7] {
            let sequential: Vec<SimilarityPair> =
                match_by_shared_attribute_threshold(&entities, threshold).unwrap().collect();
            assert_eq!(matcher.pairs(&entities, threshold).unwrap(), sequential);
        }
    }

    #[test]
    fn parallel_groups_match_sequential() {
        let entities = fleet(1000);
        let matcher = always_parallel(3);
        let sequential: Vec<Group> = group_by_exact_attributes(&entities).unwrap().collect();
        assert_eq!(matcher.groups(&entities, 2).unwrap(), sequential);
        assert_eq!(sequential.len(), 64);
    }

    #[test]
    fn parallel_pass_validates_input() {
        let matcher = always_parallel(2);
        let entities = vec![Entity::new("a", ["x"]), Entity::new("a", ["y"])];
        assert!(matches!(matcher.pairs(&entities, 0), Err(Error::DuplicateEntity(_))));
        assert!(matches!(matcher.groups(&entities, 2), Err(Error::DuplicateEntity(_))));
        assert!(matches!(matcher.pairs(&fleet(4), -3), Err(Error::InvalidArgument(_))));
        assert!(matches!(matcher.groups(&fleet(4), 1), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn small_inputs_fall_back_to_sequential() {
        let config = ProcessorConfig {
            parallel: true,
            parallel_thread_count: 1,
            min_parallel_entities: 100,
        };
        let matcher = ParallelMatcher::new(config).unwrap();
        let entities = fleet(8);
        assert_eq!(matcher.pairs(&entities, 0).unwrap().len(), 28);
    }

    #[test]
    fn dedicated_pool_uses_configured_threads() {
        assert_eq!(always_parallel(2).thread_count(), 2);
    }
}

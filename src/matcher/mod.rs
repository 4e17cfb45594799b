pub mod intersection;
pub mod exact;
pub mod threshold;
pub mod parallel;

use ahash::AHashSet;

use crate::error::{Error, Result};
use crate::types::Entity;

// Re-export the main entry points
pub use self::exact::{group_by_exact_attributes, AttributeIndex, ExactMatchGrouper, Groups};
pub use self::threshold::{match_by_shared_attribute_threshold, SimilarityPairs, ThresholdMatcher};
pub use self::parallel::ParallelMatcher;
pub use self::intersection::shared_attribute_count;

/// Fails on the first repeated entity id.
pub fn validate_unique_ids(entities: &[Entity]) -> Result<()> {
    let mut seen = AHashSet::with_capacity(entities.len());
    for entity in entities {
        if !seen.insert(entity.id()) {
            return Err(Error::DuplicateEntity(entity.id().clone()));
        }
    }
    Ok(())
}

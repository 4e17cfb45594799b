//! attrmatch groups devices (or any entities) by the attribute tokens they
//! carry. It provides exact-match grouping through a canonical attribute-set
//! index and threshold matching through pairwise shared-attribute counts.

// Module declarations
pub mod error;
pub mod types;
pub mod matcher;
pub mod ingest;
pub mod config;

// Re-exports
pub use error::{Error, Result};
pub use types::{AttributeSetKey, Entity, EntityId, Group, SimilarityPair};
pub use matcher::{
    group_by_exact_attributes,
    match_by_shared_attribute_threshold,
    ExactMatchGrouper,
    ParallelMatcher,
    ThresholdMatcher,
};

// Re-export the config from config module
pub use config::AttrMatchConfig;

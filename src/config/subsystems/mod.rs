pub mod matcher;
pub mod grouper;
pub mod processor;

pub use matcher::MatcherConfig;
pub use grouper::GrouperConfig;
pub use processor::ProcessorConfig;

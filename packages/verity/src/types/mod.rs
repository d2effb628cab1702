//! Data types for the evidence pipeline.

pub mod cache;
pub mod config;
pub mod record;
pub mod state;
pub mod study;
pub mod verdict;

pub use cache::{CacheEntry, CacheStats, ResultPayload};
pub use config::VerityConfig;
pub use record::{AbstractSection, RawAuthor, RawRecord};
pub use state::{PipelineState, StagePatch};
pub use study::{Study, StudyType};
pub use verdict::Verdict;

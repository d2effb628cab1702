//! Evidence-Grounded Claim Verification Library
//!
//! Takes a natural-language health claim, searches the published
//! literature, scores what it finds, and synthesizes one of six
//! evidence-strength verdicts with a grounded summary.
//!
//! # Design Philosophy
//!
//! **"Degrade, don't fail"**
//!
//! - Every pipeline run ends with a verdict; stages fall back instead of erroring
//! - Collaborators (search, generation, storage) sit behind traits
//! - Generation output is parsed defensively and never trusted for derived
//!   fields like the verdict glyph
//! - Resilience (cache, rate limiting, retries) wraps the pipeline rather
//!   than leaking into it
//!
//! # Usage
//!
//! ```rust,ignore
//! use verity::{Pipeline, Verity};
//! use verity::stores::MemoryResultStore;
//! use verity::testing::{MockGeneration, MockSearch};
//!
//! let pipeline = Pipeline::new(MockSearch::new(), MockGeneration::new());
//! let service = Verity::new(pipeline, MemoryResultStore::new());
//!
//! let outcome = service.check("203.0.113.7", "creatine improves strength").await?;
//! println!("{} {}", outcome.verdict_emoji, outcome.summary);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator abstractions (LiteratureSearch, TextGeneration, ResultStore)
//! - [`types`] - Domain data types (Study, Verdict, PipelineState, CacheEntry)
//! - [`pipeline`] - The retrieval, quality, and synthesis stages
//! - [`extract`] - Raw record to Study extraction
//! - [`claim`] - Claim normalization for cache keys
//! - [`cache`] - TTL result cache with in-place refresh
//! - [`limiter`] - Per-client sliding-window rate limiter
//! - [`retry`] - Backoff wrapper for generation calls
//! - [`validate`] - Claim specificity pre-filter
//! - [`service`] - The composed Verity facade
//! - [`testing`] - Mock implementations for testing

pub mod cache;
pub mod claim;
pub mod error;
pub mod extract;
pub mod limiter;
pub mod pipeline;
pub mod retry;
pub mod search;
pub mod service;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;
pub mod validate;

// Re-export core types at crate root
pub use error::{GenerationError, Result, SearchError, VerityError};
pub use traits::{
    generation::{Prompt, TextGeneration},
    search::LiteratureSearch,
    store::ResultStore,
};
pub use types::{
    cache::{CacheEntry, CacheStats, ResultPayload},
    config::VerityConfig,
    record::{AbstractSection, RawAuthor, RawRecord},
    state::{PipelineState, StagePatch},
    study::{Study, StudyType},
    verdict::Verdict,
};

// Re-export the pipeline and its stage helpers
pub use pipeline::Pipeline;
pub use pipeline::{
    quality::{fallback_score, rank_studies},
    retrieval::{NO_STUDIES_FOUND, SEARCH_UNAVAILABLE},
    synthesis::{NO_EVIDENCE_SUMMARY, UNAVAILABLE_SUMMARY},
};

// Re-export resilience components
pub use cache::ResultCache;
pub use claim::normalize_claim;
pub use limiter::{Admission, Clock, RateLimiter, SystemClock};
pub use retry::{complete_with_retry, RetryPolicy};

// Re-export stores and search wrappers
pub use search::{LiteratureSearchExt, RateLimitedSearch};
pub use stores::MemoryResultStore;

// Re-export the service facade and validation
pub use service::{CheckOutcome, Verity};
pub use validate::{validate_claim, ClaimValidation};

//! The top-level service facade.
//!
//! Composes the pipeline with the resilience layer: per-client rate
//! limiting at the front door, the result cache around the pipeline, and
//! claim validation as an optional pre-filter. This is the type an HTTP
//! handler or CLI would hold.

use std::time::Instant;

use tracing::info;

use crate::cache::ResultCache;
use crate::error::{Result, VerityError};
use crate::limiter::{Admission, Clock, RateLimiter, SystemClock};
use crate::pipeline::retrieval::SEARCH_UNAVAILABLE;
use crate::pipeline::synthesis::UNAVAILABLE_SUMMARY;
use crate::pipeline::Pipeline;
use crate::traits::generation::TextGeneration;
use crate::traits::search::LiteratureSearch;
use crate::traits::store::ResultStore;
use crate::types::cache::{CacheEntry, CacheStats, ResultPayload};
use crate::types::state::PipelineState;
use crate::types::study::Study;
use crate::types::verdict::Verdict;
use crate::validate::{self, ClaimValidation};

/// Result of one claim check, cached or freshly computed.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub claim: String,
    pub verdict: Verdict,
    pub verdict_emoji: String,
    pub summary: String,
    pub top_studies: Vec<Study>,
    pub stats: CacheStats,

    /// Whether the answer came from the cache
    pub cache_hit: bool,

    /// Cache entry version, when the result was cached
    pub cache_version: Option<u32>,
}

impl CheckOutcome {
    fn from_entry(entry: CacheEntry) -> Self {
        Self {
            claim: entry.original_claim,
            verdict: entry.verdict,
            verdict_emoji: entry.verdict_emoji,
            summary: entry.summary,
            top_studies: entry.studies,
            stats: entry.stats,
            cache_hit: true,
            cache_version: Some(entry.version),
        }
    }
}

/// Claim-verification service: pipeline plus cache plus rate limiting.
pub struct Verity<S, G, R, C: Clock = SystemClock> {
    pipeline: Pipeline<S, G>,
    cache: ResultCache<R>,
    limiter: RateLimiter<C>,
}

impl<S, G, R> Verity<S, G, R, SystemClock>
where
    S: LiteratureSearch,
    G: TextGeneration,
    R: ResultStore,
{
    /// Build a service over a result store, with the default limiter
    /// (5 requests per minute per client). The cache TTL comes from the
    /// pipeline config's `cache_ttl`.
    pub fn new(pipeline: Pipeline<S, G>, store: R) -> Self {
        let cache = ResultCache::with_ttl(store, pipeline.config().cache_ttl);
        Self {
            pipeline,
            cache,
            limiter: RateLimiter::default(),
        }
    }
}

impl<S, G, R, C> Verity<S, G, R, C>
where
    S: LiteratureSearch,
    G: TextGeneration,
    R: ResultStore,
    C: Clock,
{
    /// Build a service with a custom limiter. The cache TTL comes from the
    /// pipeline config's `cache_ttl`.
    pub fn with_limiter(
        pipeline: Pipeline<S, G>,
        store: R,
        limiter: RateLimiter<C>,
    ) -> Self {
        let cache = ResultCache::with_ttl(store, pipeline.config().cache_ttl);
        Self {
            pipeline,
            cache,
            limiter,
        }
    }

    pub fn cache(&self) -> &ResultCache<R> {
        &self.cache
    }

    pub fn pipeline(&self) -> &Pipeline<S, G> {
        &self.pipeline
    }

    /// Validate a claim without running the pipeline.
    pub async fn validate(&self, claim: &str) -> Result<ClaimValidation> {
        validate::validate_claim(
            self.pipeline.generation(),
            claim,
            self.pipeline.retry_policy(),
        )
        .await
    }

    /// Check a claim for a client: rate limit, consult the cache, run the
    /// pipeline on a miss, cache the result.
    pub async fn check(&self, client: &str, claim: &str) -> Result<CheckOutcome> {
        match self.limiter.check(client) {
            Admission::Admitted => {}
            Admission::Rejected { retry_after } => {
                info!(client, "request rejected by rate limiter");
                return Err(VerityError::RateLimited { retry_after });
            }
        }

        if let Some(entry) = self.cache.lookup(claim).await? {
            return Ok(CheckOutcome::from_entry(entry));
        }

        let started = Instant::now();
        let state = self.pipeline.run(claim).await;
        let execution_time = started.elapsed().as_secs_f64();

        let verdict = state.verdict.unwrap_or(Verdict::Inconclusive);
        let summary = state
            .summary
            .clone()
            .unwrap_or_else(|| UNAVAILABLE_SUMMARY.to_string());
        let stats = CacheStats {
            found: state.raw_studies.len(),
            scored: state.scored_studies.len(),
            selected: state.top_studies.len(),
        };

        // Results produced while the search backend was down would pin a
        // wrong "no evidence" answer for a full TTL. Serve them, skip the
        // cache.
        let cache_version = if search_was_unavailable(&state) {
            info!(claim, "search was unavailable, result not cached");
            None
        } else {
            let payload = ResultPayload {
                verdict,
                summary: summary.clone(),
                top_studies: state.top_studies.clone(),
                stats,
                execution_time,
            };
            Some(self.cache.save(claim, payload).await?.version)
        };

        Ok(CheckOutcome {
            claim: claim.to_string(),
            verdict,
            verdict_emoji: verdict.glyph().to_string(),
            summary,
            top_studies: state.top_studies,
            stats,
            cache_hit: false,
            cache_version,
        })
    }

    /// Run the pipeline directly, bypassing the limiter and cache.
    pub async fn run_pipeline(&self, claim: &str) -> PipelineState {
        self.pipeline.run(claim).await
    }
}

fn search_was_unavailable(state: &PipelineState) -> bool {
    state.search_error.as_deref() == Some(SEARCH_UNAVAILABLE)
}

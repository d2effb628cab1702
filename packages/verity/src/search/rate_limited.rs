//! Rate-limited search wrapper.
//!
//! Wraps any LiteratureSearch implementation with provider-side pacing
//! using the governor crate. This is distinct from the per-client limiter
//! at the pipeline entry point: this one smooths our own outbound request
//! rate against the search provider's published limits.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::SearchServiceResult;
use crate::traits::search::LiteratureSearch;
use crate::types::record::RawRecord;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A search wrapper that paces outbound requests.
pub struct RateLimitedSearch<S: LiteratureSearch> {
    inner: S,
    limiter: Arc<DefaultRateLimiter>,
}

impl<S: LiteratureSearch> RateLimitedSearch<S> {
    /// Create a new rate-limited search.
    ///
    /// # Arguments
    /// * `search` - The underlying search service to wrap
    /// * `requests_per_second` - Maximum requests per second
    pub fn new(search: S, requests_per_second: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).expect("requests_per_second must be > 0"),
        );
        Self {
            inner: search,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Create with the default pace of 3 requests per second, the common
    /// unauthenticated limit for public bibliographic APIs.
    pub fn with_default_pace(search: S) -> Self {
        Self {
            inner: search,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(nonzero!(3u32)))),
        }
    }

    /// Create with a custom quota.
    pub fn with_quota(search: S, quota: Quota) -> Self {
        Self {
            inner: search,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Wait for rate limiter before proceeding.
    async fn wait_for_permit(&self) {
        self.limiter.until_ready().await;
    }
}

#[async_trait]
impl<S: LiteratureSearch> LiteratureSearch for RateLimitedSearch<S> {
    async fn search(&self, query: &str, max_results: usize) -> SearchServiceResult<Vec<String>> {
        self.wait_for_permit().await;
        self.inner.search(query, max_results).await
    }

    async fn fetch(&self, ids: &[String]) -> SearchServiceResult<Vec<RawRecord>> {
        self.wait_for_permit().await;
        self.inner.fetch(ids).await
    }
}

/// Extension trait for easy rate limiting.
pub trait LiteratureSearchExt: LiteratureSearch + Sized {
    /// Wrap this search service with outbound pacing.
    fn rate_limited(self, requests_per_second: u32) -> RateLimitedSearch<Self> {
        RateLimitedSearch::new(self, requests_per_second)
    }
}

impl<S: LiteratureSearch + Sized> LiteratureSearchExt for S {}

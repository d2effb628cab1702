//! Pipeline configuration.

use chrono::Duration;

/// Tunables for the evidence pipeline.
#[derive(Debug, Clone)]
pub struct VerityConfig {
    /// Maximum search queries generated per claim. Default: 3.
    pub max_queries: usize,

    /// Maximum results requested per query. Default: 6.
    pub results_per_query: usize,

    /// Number of top studies kept for synthesis. Default: 5.
    pub top_k: usize,

    /// How long cached results stay fresh. Default: 30 days.
    pub cache_ttl: Duration,
}

impl Default for VerityConfig {
    fn default() -> Self {
        Self {
            max_queries: 3,
            results_per_query: 6,
            top_k: 5,
            cache_ttl: Duration::days(30),
        }
    }
}

impl VerityConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of generated queries.
    pub fn with_max_queries(mut self, max: usize) -> Self {
        self.max_queries = max;
        self
    }

    /// Set the per-query result limit.
    pub fn with_results_per_query(mut self, max: usize) -> Self {
        self.results_per_query = max;
        self
    }

    /// Set the top-K selection size.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Set the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

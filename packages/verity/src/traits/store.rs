//! Result store seam for cached verification results.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::types::cache::{CacheEntry, ResultPayload};

/// Persistent store for [`CacheEntry`] records, keyed by normalized claim.
///
/// The store itself is TTL-agnostic on reads: `get` returns expired entries
/// too, and the cache service decides whether they count as hits. `upsert`
/// is a single read-check-write so that concurrent writers for the same key
/// cannot create duplicate entries or skip version increments.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Fetch the entry for a normalized claim, expired or not.
    async fn get(&self, normalized_claim: &str) -> Result<Option<CacheEntry>>;

    /// Insert a fresh entry, or refresh an existing one in place.
    ///
    /// Refreshing preserves `created_at` and increments `version`.
    async fn upsert(
        &self,
        normalized_claim: &str,
        original_claim: &str,
        payload: ResultPayload,
        ttl: Duration,
    ) -> Result<CacheEntry>;

    /// Record an access time for a valid hit.
    async fn touch(&self, normalized_claim: &str, at: DateTime<Utc>) -> Result<()>;
}

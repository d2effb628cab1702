//! Result cache over a [`ResultStore`].
//!
//! Keys are normalized claims, so "Does creatine help?" and "does creatine
//! help" share an entry. Expiry is decided here, not in the store: an
//! expired entry is a miss for serving, but it stays in the store so the
//! next save refreshes it in place (preserving `created_at`, bumping
//! `version`) instead of starting over at version 1.

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::claim::normalize_claim;
use crate::error::Result;
use crate::traits::store::ResultStore;
use crate::types::cache::{CacheEntry, ResultPayload};

/// Claim-keyed result cache with a fixed TTL.
pub struct ResultCache<R> {
    store: R,
    ttl: Duration,
}

impl<R: ResultStore> ResultCache<R> {
    /// Cache with the default 30-day TTL.
    pub fn new(store: R) -> Self {
        Self {
            store,
            ttl: Duration::days(30),
        }
    }

    /// Cache with a custom TTL.
    pub fn with_ttl(store: R, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Look up a claim. Expired entries are misses but are left in place.
    pub async fn lookup(&self, claim: &str) -> Result<Option<CacheEntry>> {
        let key = normalize_claim(claim);

        let Some(mut entry) = self.store.get(&key).await? else {
            debug!(%key, "cache miss");
            return Ok(None);
        };

        let now = Utc::now();
        if entry.is_expired_at(now) {
            debug!(%key, version = entry.version, "cache entry expired");
            return Ok(None);
        }

        self.store.touch(&key, now).await?;
        entry.last_accessed = now;
        info!(%key, version = entry.version, "cache hit");
        Ok(Some(entry))
    }

    /// Save a pipeline result, refreshing any existing entry for the claim.
    pub async fn save(&self, claim: &str, payload: ResultPayload) -> Result<CacheEntry> {
        let key = normalize_claim(claim);
        let entry = self.store.upsert(&key, claim, payload, self.ttl).await?;
        info!(%key, version = entry.version, "cached verification result");
        Ok(entry)
    }
}

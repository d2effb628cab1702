//! In-memory result store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::traits::store::ResultStore;
use crate::types::cache::{CacheEntry, ResultPayload};

/// A [`ResultStore`] backed by a `HashMap` behind an `RwLock`.
///
/// Suitable for tests and single-process deployments; data is lost on
/// restart. The upsert holds the write lock across the read-check-write, so
/// two racing writers for the same claim produce one entry at version 2,
/// never two entries.
#[derive(Default)]
pub struct MemoryResultStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryResultStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn entry_count(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn get(&self, normalized_claim: &str) -> Result<Option<CacheEntry>> {
        Ok(self
            .entries
            .read()
            .unwrap()
            .get(normalized_claim)
            .cloned())
    }

    async fn upsert(
        &self,
        normalized_claim: &str,
        original_claim: &str,
        payload: ResultPayload,
        ttl: Duration,
    ) -> Result<CacheEntry> {
        let now = Utc::now();
        let mut entries = self.entries.write().unwrap();

        let entry = match entries.get_mut(normalized_claim) {
            Some(existing) => {
                existing.refresh(payload, ttl, now);
                existing.clone()
            }
            None => {
                let entry =
                    CacheEntry::new(normalized_claim, original_claim, payload, ttl, now);
                entries.insert(normalized_claim.to_string(), entry.clone());
                entry
            }
        };
        Ok(entry)
    }

    async fn touch(&self, normalized_claim: &str, at: DateTime<Utc>) -> Result<()> {
        if let Some(entry) = self.entries.write().unwrap().get_mut(normalized_claim) {
            entry.last_accessed = at;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::cache::CacheStats;
    use crate::types::verdict::Verdict;
    use tokio_test::assert_ok;

    fn payload(verdict: Verdict) -> ResultPayload {
        ResultPayload {
            verdict,
            summary: "summary".into(),
            top_studies: vec![],
            stats: CacheStats::default(),
            execution_time: 2.0,
        }
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let store = MemoryResultStore::new();

        let entry = store
            .upsert("key", "Key?", payload(Verdict::Supported), Duration::days(30))
            .await
            .unwrap();
        assert_eq!(entry.version, 1);
        assert_eq!(entry.original_claim, "Key?");

        let fetched = store.get("key").await.unwrap().unwrap();
        assert_eq!(fetched.verdict, Verdict::Supported);
        assert_eq!(store.entry_count(), 1);
    }

    #[tokio::test]
    async fn second_upsert_refreshes_in_place() {
        let store = MemoryResultStore::new();

        let first = store
            .upsert("key", "Key?", payload(Verdict::Inconclusive), Duration::days(30))
            .await
            .unwrap();
        let second = store
            .upsert("key", "Key?", payload(Verdict::Supported), Duration::days(30))
            .await
            .unwrap();

        assert_eq!(second.version, 2);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.verdict, Verdict::Supported);
        assert_eq!(store.entry_count(), 1);
    }

    #[tokio::test]
    async fn touch_updates_last_accessed_only() {
        let store = MemoryResultStore::new();
        store
            .upsert("key", "Key?", payload(Verdict::Supported), Duration::days(30))
            .await
            .unwrap();

        let later = Utc::now() + Duration::hours(1);
        assert_ok!(store.touch("key", later).await);

        let entry = store.get("key").await.unwrap().unwrap();
        assert_eq!(entry.last_accessed, later);
        assert_eq!(entry.version, 1);
    }

    #[tokio::test]
    async fn touch_on_missing_key_is_a_no_op() {
        let store = MemoryResultStore::new();
        assert_ok!(store.touch("missing", Utc::now()).await);
    }
}

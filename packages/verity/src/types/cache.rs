//! Cached verification results.
//!
//! Entries are keyed by the normalized claim and expire after a TTL. An
//! expired entry is refreshed in place rather than deleted: `created_at`
//! survives every refresh and `version` counts how often the evidence has
//! been recomputed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::study::Study;
use crate::types::verdict::Verdict;

/// Per-run counters stored alongside the result.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Unique studies found by retrieval
    pub found: usize,

    /// Studies that received a quality score
    pub scored: usize,

    /// Studies selected for synthesis
    pub selected: usize,
}

/// The result data written to the cache after a pipeline run.
#[derive(Debug, Clone)]
pub struct ResultPayload {
    pub verdict: Verdict,
    pub summary: String,
    pub top_studies: Vec<Study>,
    pub stats: CacheStats,
    /// Wall-clock seconds the run took
    pub execution_time: f64,
}

/// One cached verification result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cache key (unique)
    pub normalized_claim: String,

    /// The claim as the user typed it on first insert
    pub original_claim: String,

    pub verdict: Verdict,
    pub verdict_emoji: String,
    pub summary: String,

    /// Snapshot of the top studies used for the verdict
    pub studies: Vec<Study>,

    pub stats: CacheStats,
    pub execution_time: f64,

    /// Immutable across refreshes
    pub created_at: DateTime<Utc>,

    /// Updated on every valid (non-expired) hit
    pub last_accessed: DateTime<Utc>,

    /// Updated on every refresh
    pub last_updated: DateTime<Utc>,

    /// Past this instant the entry is a miss for serving purposes
    pub expires_at: DateTime<Utc>,

    /// Starts at 1, increments on every refresh
    pub version: u32,
}

impl CacheEntry {
    /// Build a fresh entry at version 1.
    pub fn new(
        normalized_claim: impl Into<String>,
        original_claim: impl Into<String>,
        payload: ResultPayload,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            normalized_claim: normalized_claim.into(),
            original_claim: original_claim.into(),
            verdict: payload.verdict,
            verdict_emoji: payload.verdict.glyph().to_string(),
            summary: payload.summary,
            studies: payload.top_studies,
            stats: payload.stats,
            execution_time: payload.execution_time,
            created_at: now,
            last_accessed: now,
            last_updated: now,
            expires_at: now + ttl,
            version: 1,
        }
    }

    /// Whether the entry has expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Refresh an entry in place with fresh analysis data.
    ///
    /// Preserves `created_at`, increments `version`, extends `expires_at`.
    pub fn refresh(&mut self, payload: ResultPayload, ttl: Duration, now: DateTime<Utc>) {
        self.verdict = payload.verdict;
        self.verdict_emoji = payload.verdict.glyph().to_string();
        self.summary = payload.summary;
        self.studies = payload.top_studies;
        self.stats = payload.stats;
        self.execution_time = payload.execution_time;
        self.last_updated = now;
        self.expires_at = now + ttl;
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(verdict: Verdict) -> ResultPayload {
        ResultPayload {
            verdict,
            summary: "summary".into(),
            top_studies: vec![],
            stats: CacheStats::default(),
            execution_time: 1.5,
        }
    }

    #[test]
    fn refresh_preserves_created_at_and_bumps_version() {
        let created = Utc::now();
        let mut entry = CacheEntry::new(
            "does creatine improve muscle strength",
            "Does creatine improve muscle strength?",
            payload(Verdict::Supported),
            Duration::days(30),
            created,
        );
        assert_eq!(entry.version, 1);

        let later = created + Duration::days(45);
        entry.refresh(payload(Verdict::StronglySupported), Duration::days(30), later);

        assert_eq!(entry.version, 2);
        assert_eq!(entry.created_at, created);
        assert_eq!(entry.last_updated, later);
        assert_eq!(entry.expires_at, later + Duration::days(30));
        assert_eq!(entry.verdict, Verdict::StronglySupported);
        assert_eq!(entry.verdict_emoji, "✅");
    }

    #[test]
    fn expiry_is_strict() {
        let now = Utc::now();
        let entry = CacheEntry::new("k", "k", payload(Verdict::Inconclusive), Duration::days(30), now);

        assert!(!entry.is_expired_at(now + Duration::days(29)));
        assert!(entry.is_expired_at(now + Duration::days(31)));
    }
}

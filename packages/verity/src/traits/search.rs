//! Literature-search collaborator seam.

use async_trait::async_trait;

use crate::error::SearchServiceResult;
use crate::types::record::RawRecord;

/// Literature search service abstraction.
///
/// Implementations wrap a bibliographic search provider. Both operations
/// may fail per call; the retrieval stage tolerates individual failures.
#[async_trait]
pub trait LiteratureSearch: Send + Sync {
    /// Search and return record identifiers, best matches first.
    async fn search(&self, query: &str, max_results: usize) -> SearchServiceResult<Vec<String>>;

    /// Fetch full records for a list of identifiers.
    async fn fetch(&self, ids: &[String]) -> SearchServiceResult<Vec<RawRecord>>;

    /// Convenience: search then fetch in one call.
    async fn search_and_fetch(
        &self,
        query: &str,
        max_results: usize,
    ) -> SearchServiceResult<Vec<RawRecord>> {
        let ids = self.search(query, max_results).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch(&ids).await
    }
}

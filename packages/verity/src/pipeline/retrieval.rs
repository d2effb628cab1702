//! Retrieval stage: generate queries, search concurrently, deduplicate.

use futures::future::join_all;
use indexmap::IndexSet;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::extract::extract_studies;
use crate::pipeline::prompts::{format_query_prompt, strip_code_fences};
use crate::retry::{complete_with_retry, RetryPolicy};
use crate::traits::generation::TextGeneration;
use crate::traits::search::LiteratureSearch;
use crate::types::config::VerityConfig;
use crate::types::record::RawRecord;
use crate::types::state::StagePatch;

/// `search_error` value when every query failed.
pub const SEARCH_UNAVAILABLE: &str = "literature search unavailable";

/// `search_error` value when queries succeeded but matched nothing.
pub const NO_STUDIES_FOUND: &str = "no studies found";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    queries: Vec<String>,
}

/// Parse a query-generation response, accepting a bare array or an object
/// with a `queries` field.
pub fn parse_query_response(text: &str) -> Result<Vec<String>, serde_json::Error> {
    let body = strip_code_fences(text);

    if let Ok(queries) = serde_json::from_str::<Vec<String>>(body) {
        return Ok(queries);
    }

    let response: QueryResponse = serde_json::from_str(body)?;
    Ok(response.queries)
}

/// Generate up to `max_queries` search queries for a claim.
///
/// Any generation failure degrades to deterministic fallback queries; query
/// generation is never the reason a run produces nothing.
pub async fn generate_queries<G: TextGeneration>(
    generation: &G,
    claim: &str,
    max_queries: usize,
    policy: &RetryPolicy,
) -> Vec<String> {
    let prompt = format_query_prompt(claim);

    let mut queries = match complete_with_retry(generation, &prompt, policy).await {
        Ok(text) => match parse_query_response(&text) {
            Ok(queries) => queries,
            Err(error) => {
                warn!(%error, "query generation returned unparseable output");
                Vec::new()
            }
        },
        Err(error) => {
            warn!(%error, "query generation failed, using fallback queries");
            Vec::new()
        }
    };

    if queries.is_empty() {
        queries = vec![
            format!("{claim} meta-analysis"),
            format!("{claim} systematic review"),
        ];
    }

    queries.truncate(max_queries);
    queries
}

/// Run the retrieval stage.
///
/// Issues all queries concurrently; individual query failures are absorbed
/// as empty results. The output study list is deduplicated by record
/// identifier in first-seen order. `search_error` is set only when every
/// query failed, or when all succeeded but nothing was found.
pub async fn run<S, G>(
    search: &S,
    generation: &G,
    claim: &str,
    config: &VerityConfig,
    policy: &RetryPolicy,
) -> StagePatch
where
    S: LiteratureSearch,
    G: TextGeneration,
{
    let queries = generate_queries(generation, claim, config.max_queries, policy).await;
    info!(claim, query_count = queries.len(), "searching literature");

    let searches = queries
        .iter()
        .map(|query| search.search_and_fetch(query, config.results_per_query));
    let results = join_all(searches).await;

    let mut failures = 0usize;
    let mut seen: IndexSet<String> = IndexSet::new();
    let mut unique_records: Vec<RawRecord> = Vec::new();

    for (query, result) in queries.iter().zip(results) {
        match result {
            Ok(records) => {
                debug!(query, count = records.len(), "query returned records");
                for record in records {
                    if seen.insert(record.record_id.clone()) {
                        unique_records.push(record);
                    }
                }
            }
            Err(error) => {
                warn!(query, %error, "query failed, continuing without it");
                failures += 1;
            }
        }
    }

    let studies = extract_studies(&unique_records);
    info!(unique = studies.len(), failures, "retrieval complete");

    let search_error = if !queries.is_empty() && failures == queries.len() {
        Some(SEARCH_UNAVAILABLE.to_string())
    } else if studies.is_empty() {
        Some(NO_STUDIES_FOUND.to_string())
    } else {
        None
    };

    StagePatch {
        search_queries: queries,
        raw_studies: studies,
        search_error,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockGeneration, MockSearch};

    fn config() -> VerityConfig {
        VerityConfig::default()
    }

    #[tokio::test]
    async fn deduplicates_by_record_id_in_first_seen_order() {
        let generation =
            MockGeneration::new().with_response(r#"{"queries": ["q1", "q2"]}"#);
        let search = MockSearch::new()
            .with_records(
                "q1",
                vec![
                    RawRecord::new("1", "First"),
                    RawRecord::new("2", "Second"),
                ],
            )
            .with_records(
                "q2",
                vec![
                    RawRecord::new("2", "Second again"),
                    RawRecord::new("3", "Third"),
                ],
            );

        let patch = run(&search, &generation, "claim", &config(), &RetryPolicy::no_delay()).await;

        let ids: Vec<_> = patch.raw_studies.iter().map(|s| s.record_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(patch.search_error.is_none());
    }

    #[tokio::test]
    async fn partial_failure_is_absorbed_silently() {
        let generation =
            MockGeneration::new().with_response(r#"{"queries": ["good", "bad"]}"#);
        let search = MockSearch::new()
            .with_records("good", vec![RawRecord::new("1", "Only study")])
            .with_failure("bad");

        let patch = run(&search, &generation, "claim", &config(), &RetryPolicy::no_delay()).await;

        assert_eq!(patch.raw_studies.len(), 1);
        assert!(patch.search_error.is_none());
    }

    #[tokio::test]
    async fn total_failure_sets_search_error() {
        let generation =
            MockGeneration::new().with_response(r#"{"queries": ["q1", "q2"]}"#);
        let search = MockSearch::new().with_failure("q1").with_failure("q2");

        let patch = run(&search, &generation, "claim", &config(), &RetryPolicy::no_delay()).await;

        assert!(patch.raw_studies.is_empty());
        assert_eq!(patch.search_error.as_deref(), Some(SEARCH_UNAVAILABLE));
    }

    #[tokio::test]
    async fn empty_results_are_flagged_but_distinct_from_failure() {
        let generation = MockGeneration::new().with_response(r#"{"queries": ["q1"]}"#);
        let search = MockSearch::new().with_records("q1", vec![]);

        let patch = run(&search, &generation, "claim", &config(), &RetryPolicy::no_delay()).await;

        assert!(patch.raw_studies.is_empty());
        assert_eq!(patch.search_error.as_deref(), Some(NO_STUDIES_FOUND));
    }

    #[tokio::test]
    async fn generation_failure_falls_back_to_deterministic_queries() {
        let generation = MockGeneration::new(); // no scripted responses
        let search = MockSearch::new();

        let queries = generate_queries(&generation, "does zinc help colds", 3, &RetryPolicy::no_delay()).await;
        assert_eq!(
            queries,
            vec![
                "does zinc help colds meta-analysis",
                "does zinc help colds systematic review",
            ]
        );

        // And those fallback queries are actually issued.
        let patch = run(&search, &generation, "does zinc help colds", &config(), &RetryPolicy::no_delay()).await;
        assert_eq!(patch.search_queries.len(), 2);
    }

    #[tokio::test]
    async fn query_count_is_capped() {
        let generation = MockGeneration::new()
            .with_response(r#"{"queries": ["a", "b", "c", "d", "e"]}"#);

        let queries = generate_queries(&generation, "claim", 3, &RetryPolicy::no_delay()).await;
        assert_eq!(queries.len(), 3);
    }

    #[test]
    fn parses_fenced_and_bare_responses() {
        let fenced = "```json\n{\"queries\": [\"a\"]}\n```";
        assert_eq!(parse_query_response(fenced).unwrap(), vec!["a"]);

        let bare = r#"["x", "y"]"#;
        assert_eq!(parse_query_response(bare).unwrap(), vec!["x", "y"]);
    }
}

//! The three-stage verification pipeline: retrieval, quality, synthesis.
//!
//! Stages communicate only through [`StagePatch`](crate::types::state::StagePatch)
//! values merged into a shared [`PipelineState`]; no stage mutates state
//! directly. A run never fails: each stage degrades to its documented
//! fallback and the state records what went wrong.

pub mod prompts;
pub mod quality;
pub mod retrieval;
pub mod synthesis;

use tracing::info;

use crate::retry::RetryPolicy;
use crate::traits::generation::TextGeneration;
use crate::traits::search::LiteratureSearch;
use crate::types::config::VerityConfig;
use crate::types::state::PipelineState;

/// Claim-verification pipeline over a search backend and a generation
/// service.
pub struct Pipeline<S, G> {
    search: S,
    generation: G,
    config: VerityConfig,
    retry: RetryPolicy,
}

impl<S, G> Pipeline<S, G>
where
    S: LiteratureSearch,
    G: TextGeneration,
{
    /// Pipeline with default configuration and retry policy.
    pub fn new(search: S, generation: G) -> Self {
        Self {
            search,
            generation,
            config: VerityConfig::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_config(mut self, config: VerityConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &VerityConfig {
        &self.config
    }

    pub fn generation(&self) -> &G {
        &self.generation
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Run the full pipeline for a claim.
    pub async fn run(&self, claim: &str) -> PipelineState {
        let mut state = PipelineState::new(claim);

        let patch = retrieval::run(
            &self.search,
            &self.generation,
            claim,
            &self.config,
            &self.retry,
        )
        .await;
        state.apply(patch);

        let patch = quality::run(
            &self.generation,
            &state.raw_studies,
            self.config.top_k,
            &self.retry,
        )
        .await;
        state.apply(patch);

        let patch =
            synthesis::run(&self.generation, claim, &state.top_studies, &self.retry).await;
        state.apply(patch);

        info!(
            claim,
            studies = state.raw_studies.len(),
            verdict = state.verdict.map(|v| v.label()),
            "pipeline run complete"
        );
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockGeneration, MockSearch};
    use crate::types::record::RawRecord;
    use crate::types::verdict::Verdict;

    #[tokio::test]
    async fn full_run_threads_state_through_all_stages() {
        let search = MockSearch::new().with_records(
            "q1",
            vec![RawRecord::new("1", "Meta-analysis of creatine")
                .with_abstract("RESULTS: strength up. CONCLUSIONS: effective.")],
        );
        let generation = MockGeneration::new()
            .with_response(r#"{"queries": ["q1"]}"#)
            .with_response(r#"{"scores": [{"score": 9.0, "rationale": "strong"}]}"#)
            .with_response(r#"{"verdict": "Supported", "summary": "works"}"#);

        let pipeline = Pipeline::new(search, generation);
        let state = pipeline.run("creatine improves strength").await;

        assert_eq!(state.search_queries, vec!["q1"]);
        assert_eq!(state.raw_studies.len(), 1);
        assert_eq!(state.scored_studies[0].quality_score, Some(9.0));
        assert_eq!(state.top_studies.len(), 1);
        assert_eq!(state.verdict, Some(Verdict::Supported));
        assert_eq!(state.verdict_emoji.as_deref(), Some("✓"));
        assert_eq!(state.summary.as_deref(), Some("works"));
    }

    #[tokio::test]
    async fn run_never_fails_even_when_everything_is_down() {
        let pipeline = Pipeline::new(MockSearch::new(), MockGeneration::new())
            .with_retry_policy(RetryPolicy::no_delay());

        let state = pipeline.run("any claim").await;

        // Fallback queries were issued, found nothing, and synthesis
        // short-circuited to inconclusive.
        assert_eq!(state.search_queries.len(), 2);
        assert_eq!(state.verdict, Some(Verdict::Inconclusive));
        assert!(state.summary.is_some());
    }
}

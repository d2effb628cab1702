//! Pipeline state and the per-field merge rules.
//!
//! Each stage returns an immutable [`StagePatch`]; the orchestrator merges
//! it into the shared [`PipelineState`] with an explicit per-field policy
//! (append for query/study accumulation, overwrite for everything else)
//! instead of relying on implicit map-merge behavior.

use serde::{Deserialize, Serialize};

use crate::types::study::Study;
use crate::types::verdict::Verdict;

/// State accumulated across the three pipeline stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineState {
    /// The claim under verification. Set once at construction, immutable.
    pub claim: String,

    /// Search queries issued so far (append)
    pub search_queries: Vec<String>,

    /// Deduplicated studies from retrieval (append)
    pub raw_studies: Vec<Study>,

    /// Set when retrieval failed or found nothing (overwrite)
    pub search_error: Option<String>,

    /// All studies with quality scores attached (overwrite)
    pub scored_studies: Vec<Study>,

    /// Top-K studies selected for synthesis (overwrite)
    pub top_studies: Vec<Study>,

    /// Final verdict (overwrite)
    pub verdict: Option<Verdict>,

    /// Status glyph, always derived from the verdict (overwrite)
    pub verdict_emoji: Option<String>,

    /// Human-readable evidence summary (overwrite)
    pub summary: Option<String>,
}

impl PipelineState {
    /// Create the initial state for a claim.
    pub fn new(claim: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            ..Default::default()
        }
    }

    /// Merge a stage's partial output into this state.
    ///
    /// Append fields extend, overwrite fields replace only when the patch
    /// carries a value. The glyph is derived from the patched verdict here,
    /// which is what enforces the crate-owned verdict-to-glyph mapping.
    pub fn apply(&mut self, patch: StagePatch) {
        self.search_queries.extend(patch.search_queries);
        self.raw_studies.extend(patch.raw_studies);

        if patch.search_error.is_some() {
            self.search_error = patch.search_error;
        }
        if let Some(scored) = patch.scored_studies {
            self.scored_studies = scored;
        }
        if let Some(top) = patch.top_studies {
            self.top_studies = top;
        }
        if let Some(verdict) = patch.verdict {
            self.verdict = Some(verdict);
            self.verdict_emoji = Some(verdict.glyph().to_string());
        }
        if let Some(summary) = patch.summary {
            self.summary = Some(summary);
        }
    }
}

/// Partial output of one pipeline stage.
///
/// Stages never touch `PipelineState` directly; they return one of these
/// and the orchestrator does the merge.
#[derive(Debug, Clone, Default)]
pub struct StagePatch {
    /// Appended to the state's query list
    pub search_queries: Vec<String>,

    /// Appended to the state's study list (already deduplicated)
    pub raw_studies: Vec<Study>,

    /// Overwrites when present
    pub search_error: Option<String>,

    /// Overwrites when present
    pub scored_studies: Option<Vec<Study>>,

    /// Overwrites when present
    pub top_studies: Option<Vec<Study>>,

    /// Overwrites when present; the glyph follows automatically
    pub verdict: Option<Verdict>,

    /// Overwrites when present
    pub summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::study::StudyType;

    fn study(id: &str) -> Study {
        Study {
            record_id: id.into(),
            title: format!("Study {id}"),
            authors: "Unknown".into(),
            journal: "J".into(),
            year: 2024,
            study_type: StudyType::Observational,
            sample_size: 0,
            abstract_text: String::new(),
            url: String::new(),
            quality_score: None,
            quality_rationale: None,
        }
    }

    #[test]
    fn append_fields_accumulate_across_patches() {
        let mut state = PipelineState::new("claim");

        state.apply(StagePatch {
            search_queries: vec!["q1".into()],
            raw_studies: vec![study("a")],
            ..Default::default()
        });
        state.apply(StagePatch {
            search_queries: vec!["q2".into()],
            raw_studies: vec![study("b")],
            ..Default::default()
        });

        assert_eq!(state.search_queries, vec!["q1", "q2"]);
        assert_eq!(state.raw_studies.len(), 2);
    }

    #[test]
    fn overwrite_fields_replace_previous_values() {
        let mut state = PipelineState::new("claim");

        state.apply(StagePatch {
            top_studies: Some(vec![study("a"), study("b")]),
            ..Default::default()
        });
        state.apply(StagePatch {
            top_studies: Some(vec![study("c")]),
            ..Default::default()
        });

        assert_eq!(state.top_studies.len(), 1);
        assert_eq!(state.top_studies[0].record_id, "c");
    }

    #[test]
    fn empty_patch_leaves_overwrite_fields_alone() {
        let mut state = PipelineState::new("claim");
        state.apply(StagePatch {
            search_error: Some("no studies found".into()),
            verdict: Some(Verdict::Supported),
            ..Default::default()
        });

        state.apply(StagePatch::default());

        assert_eq!(state.search_error.as_deref(), Some("no studies found"));
        assert_eq!(state.verdict, Some(Verdict::Supported));
    }

    #[test]
    fn glyph_always_tracks_the_verdict() {
        let mut state = PipelineState::new("claim");
        state.apply(StagePatch {
            verdict: Some(Verdict::Contradicted),
            ..Default::default()
        });

        assert_eq!(state.verdict_emoji.as_deref(), Some("🚫"));
    }

    #[test]
    fn claim_is_set_once() {
        let mut state = PipelineState::new("original claim");
        state.apply(StagePatch::default());
        assert_eq!(state.claim, "original claim");
    }
}

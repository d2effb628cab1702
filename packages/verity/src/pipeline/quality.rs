//! Quality stage: score every study, rank, select the top K.
//!
//! Scoring is delegated to the generation service in one batched call. When
//! the call fails, returns something unparseable, or comes back short, the
//! deterministic fallback heuristic fills in per study — a short batch
//! response must never silently drop the unscored remainder.

use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::pipeline::prompts::{format_score_prompt, strip_code_fences};
use crate::retry::{complete_with_retry, RetryPolicy};
use crate::traits::generation::TextGeneration;
use crate::types::state::StagePatch;
use crate::types::study::Study;

/// One score entry from the batched scoring response.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreEntry {
    pub score: f64,
    #[serde(default)]
    pub rationale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    #[serde(default)]
    scores: Vec<ScoreEntry>,
}

/// Parse a scoring response, accepting a bare array or an object with a
/// `scores` field.
pub fn parse_score_response(text: &str) -> Result<Vec<ScoreEntry>, serde_json::Error> {
    let body = strip_code_fences(text);

    if let Ok(entries) = serde_json::from_str::<Vec<ScoreEntry>>(body) {
        return Ok(entries);
    }

    let response: ScoreResponse = serde_json::from_str(body)?;
    Ok(response.scores)
}

/// Deterministic fallback score for one study.
///
/// Weighted toward study type, with small bonuses for large samples and
/// recent publication, capped at 10.0.
pub fn fallback_score(study: &Study) -> (f64, String) {
    let type_label = study.study_type.to_string();

    let mut score: f64 = 5.0;
    if type_label.contains("meta-analysis") {
        score = 9.0;
    } else if type_label.contains("systematic review") {
        score = 7.5;
    } else if type_label.contains("rct") || type_label.contains("randomized") {
        score = 6.5;
    }

    if study.sample_size > 1000 {
        score += 0.5;
    }
    if study.year >= Utc::now().year() - 2 {
        score += 0.5;
    }

    (
        score.min(10.0),
        format!("Fallback score based on {type_label} type"),
    )
}

/// Stable rank by score descending, truncated to `top_n`.
///
/// Equal scores keep their original (insertion) order; unscored studies
/// sort last.
pub fn rank_studies(scored: &[Study], top_n: usize) -> Vec<Study> {
    let mut ranked = scored.to_vec();
    ranked.sort_by(|a, b| {
        b.quality_score
            .partial_cmp(&a.quality_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(top_n);
    ranked
}

/// Run the quality stage over the retrieved studies.
pub async fn run<G: TextGeneration>(
    generation: &G,
    studies: &[Study],
    top_k: usize,
    policy: &RetryPolicy,
) -> StagePatch {
    if studies.is_empty() {
        return StagePatch {
            scored_studies: Some(Vec::new()),
            top_studies: Some(Vec::new()),
            ..Default::default()
        };
    }

    let prompt = format_score_prompt(studies);
    let entries: Vec<Option<ScoreEntry>> =
        match complete_with_retry(generation, &prompt, policy).await {
            Ok(text) => match parse_score_response(&text) {
                Ok(parsed) => {
                    if parsed.len() < studies.len() {
                        warn!(
                            expected = studies.len(),
                            received = parsed.len(),
                            "short scoring batch, filling the rest with fallback scores"
                        );
                    }
                    let mut entries: Vec<Option<ScoreEntry>> =
                        parsed.into_iter().map(Some).collect();
                    entries.resize(studies.len(), None);
                    entries
                }
                Err(error) => {
                    warn!(%error, "malformed scoring output, falling back for all studies");
                    vec![None; studies.len()]
                }
            },
            Err(error) => {
                warn!(%error, "scoring call failed, falling back for all studies");
                vec![None; studies.len()]
            }
        };

    let scored: Vec<Study> = studies
        .iter()
        .zip(entries)
        .map(|(study, entry)| match entry {
            Some(entry) => study.clone().with_score(
                entry.score.clamp(0.0, 10.0),
                entry
                    .rationale
                    .unwrap_or_else(|| "No rationale provided".to_string()),
            ),
            None => {
                let (score, rationale) = fallback_score(study);
                study.clone().with_score(score, rationale)
            }
        })
        .collect();

    let top = rank_studies(&scored, top_k);
    info!(scored = scored.len(), selected = top.len(), "quality ranking complete");

    StagePatch {
        scored_studies: Some(scored),
        top_studies: Some(top),
        ..Default::default()
    }
}

//! Synthesis stage: weigh the top studies and produce a verdict.
//!
//! A run always ends with a verdict and a summary. With no evidence to
//! weigh the stage short-circuits to `Inconclusive` without calling the
//! generation service; generation or parse failures degrade to
//! `Inconclusive` with a fixed "try again" summary rather than surfacing
//! raw provider text to the caller.

use serde::Deserialize;
use tracing::{info, warn};

use crate::pipeline::prompts::{format_synthesis_prompt, strip_code_fences};
use crate::retry::{complete_with_retry, RetryPolicy};
use crate::traits::generation::TextGeneration;
use crate::types::state::StagePatch;
use crate::types::study::Study;
use crate::types::verdict::Verdict;

/// Summary when retrieval found no relevant studies.
pub const NO_EVIDENCE_SUMMARY: &str = "No relevant published studies were found for this \
claim, so there is no evidence to weigh either way.";

/// Summary when synthesis itself could not run.
pub const UNAVAILABLE_SUMMARY: &str = "We could not analyze the evidence for this claim \
right now. Please try again in a few minutes.";

/// Parsed synthesis output. The glyph is deliberately absent: providers do
/// not get to choose it, the verdict enum does.
#[derive(Debug, Deserialize)]
struct SynthesisResponse {
    verdict: String,
    #[serde(default)]
    summary: Option<String>,
}

fn parse_synthesis_response(text: &str) -> Result<SynthesisResponse, serde_json::Error> {
    serde_json::from_str(strip_code_fences(text))
}

/// Run the synthesis stage over the selected top studies.
pub async fn run<G: TextGeneration>(
    generation: &G,
    claim: &str,
    top_studies: &[Study],
    policy: &RetryPolicy,
) -> StagePatch {
    if top_studies.is_empty() {
        info!(claim, "no evidence to synthesize, returning inconclusive");
        return StagePatch {
            verdict: Some(Verdict::Inconclusive),
            summary: Some(NO_EVIDENCE_SUMMARY.to_string()),
            ..Default::default()
        };
    }

    let prompt = format_synthesis_prompt(claim, top_studies);
    let response = match complete_with_retry(generation, &prompt, policy).await {
        Ok(text) => match parse_synthesis_response(&text) {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "malformed synthesis output");
                return unavailable_patch();
            }
        },
        Err(error) => {
            warn!(%error, "synthesis call failed");
            return unavailable_patch();
        }
    };

    let verdict = Verdict::parse(&response.verdict).unwrap_or_else(|| {
        warn!(raw = %response.verdict, "unrecognized verdict label, using inconclusive");
        Verdict::Inconclusive
    });
    info!(claim, verdict = verdict.label(), "synthesis complete");

    StagePatch {
        verdict: Some(verdict),
        summary: Some(
            response
                .summary
                .unwrap_or_else(|| UNAVAILABLE_SUMMARY.to_string()),
        ),
        ..Default::default()
    }
}

fn unavailable_patch() -> StagePatch {
    StagePatch {
        verdict: Some(Verdict::Inconclusive),
        summary: Some(UNAVAILABLE_SUMMARY.to_string()),
        ..Default::default()
    }
}

//! Claim pre-filter.
//!
//! Before the pipeline spends three generation calls and a search fan-out
//! on a claim, a single cheap call checks that it names an intervention and
//! an outcome. Vague claims come back with concrete suggestions.

use serde::Deserialize;
use tracing::info;

use crate::error::{GenerationError, Result, VerityError};
use crate::pipeline::prompts::{format_validation_prompt, strip_code_fences};
use crate::retry::{complete_with_retry, RetryPolicy};
use crate::traits::generation::TextGeneration;

/// Outcome of validating a claim.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimValidation {
    pub valid: bool,

    #[serde(default)]
    pub reason: Option<String>,

    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Check whether a claim is specific enough to verify.
///
/// Unlike the pipeline stages this propagates failures: a validator that
/// cannot run should not silently wave claims through, and
/// [`VerityError::ProviderExhausted`] from the retry wrapper reaches the
/// caller unchanged.
pub async fn validate_claim<G: TextGeneration>(
    generation: &G,
    claim: &str,
    policy: &RetryPolicy,
) -> Result<ClaimValidation> {
    let prompt = format_validation_prompt(claim);
    let text = complete_with_retry(generation, &prompt, policy).await?;

    let validation: ClaimValidation = serde_json::from_str(strip_code_fences(&text))
        .map_err(|e| GenerationError::MalformedOutput(e.to_string()))?;

    info!(claim, valid = validation.valid, "claim validated");
    Ok(validation)
}

/// Convenience: validate and convert a rejection into an error.
pub async fn require_valid_claim<G: TextGeneration>(
    generation: &G,
    claim: &str,
    policy: &RetryPolicy,
) -> Result<()> {
    let validation = validate_claim(generation, claim, policy).await?;
    if validation.valid {
        return Ok(());
    }
    Err(VerityError::InvalidClaim {
        reason: validation
            .reason
            .unwrap_or_else(|| "claim is too vague to verify".to_string()),
        suggestions: validation.suggestions,
    })
}

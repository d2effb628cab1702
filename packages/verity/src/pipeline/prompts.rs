//! Prompt templates and response-cleaning helpers.
//!
//! Prompt wording lives here in one place so the stages stay mechanical.
//! Responses are expected as JSON, but providers habitually wrap JSON in
//! markdown code fences, so parsing always goes through
//! [`strip_code_fences`] first.

use crate::traits::generation::Prompt;
use crate::types::study::Study;

/// System prompt for search-query generation.
pub const QUERY_PROMPT: &str = "\
You are a scientific research expert. Generate 2-3 optimized literature \
search queries to find high-quality evidence about a health claim.

REQUIREMENTS:
- Prioritize meta-analyses, systematic reviews, and RCTs
- Use medical/scientific terminology
- Include study type keywords (meta-analysis, systematic review, randomized controlled trial, RCT)
- Keep queries focused and specific

OUTPUT FORMAT (JSON):
{\"queries\": [\"query 1\", \"query 2\", \"query 3\"]}";

/// System prompt for batch quality scoring.
pub const SCORE_PROMPT: &str = "\
You are a scientific quality assessor. Score each study from 0-10 based on:

CRITERIA:
1. Study Type (40% weight): meta-analysis highest, then systematic review, \
RCT, cohort/observational, case study lowest.
2. Sample Size (30% weight): n > 1000 full points, scaling down; n = 0 \
(meta-analysis aggregate) moderate points.
3. Journal Quality (20% weight): high-impact journals highest.
4. Recency (10% weight): last 2 years full points, older scaling down.

Score every study, in the order given.

OUTPUT FORMAT (JSON):
{\"scores\": [{\"score\": 8.5, \"rationale\": \"brief 1-2 sentence explanation\"}, ...]}";

/// System prompt for verdict synthesis.
pub const SYNTHESIS_PROMPT: &str = "\
You are a health science communicator who explains research to everyday \
people. Analyze the provided studies and generate a clear verdict about a \
health claim.

VERDICT OPTIONS:
1. \"Strongly Supported\" - multiple high-quality studies show consistent positive evidence
2. \"Supported\" - good quality studies show positive evidence with some consistency
3. \"Partially Supported\" - mixed evidence, or limited scope of support
4. \"Inconclusive\" - insufficient evidence, conflicting results, or low-quality studies
5. \"Not Supported\" - quality studies show no benefit
6. \"Contradicted\" - strong evidence actively contradicts the claim

SUMMARY STRUCTURE - use these exact sections:

**Bottom Line:**
One clear sentence - does it work or not?

**What the Evidence Found:**
Key findings with numbers and specifics.

**Who Benefits Most:**
The populations the studies actually examined.

**Dosage & Timing:**
Only include this section if the studies report it.

**Caveats:**
Important limitations or warnings.

GROUNDING RULES:
- Only assert facts present in the supplied study abstracts
- Where a detail (dosage, sub-population, etc.) is missing, write \
\"not reported in these studies\" rather than guessing
- Ignore studies that are not relevant to the claim; if none are relevant, \
use verdict \"Inconclusive\"

OUTPUT FORMAT (JSON):
{\"verdict\": \"verdict label\", \"summary\": \"sectioned summary here\"}";

/// System prompt for claim validation.
pub const VALIDATION_PROMPT: &str = "\
You are a health claim validator. Determine if a claim is SPECIFIC enough \
to search for scientific evidence.

A VALID claim must have:
1. A specific INTERVENTION (supplement, treatment, activity, food, etc.)
2. A specific OUTCOME (what effect or condition is being measured)

Respond with JSON only:
{\"valid\": true/false, \"reason\": \"brief explanation\", \
\"suggestions\": [\"specific claim 1\", \"specific claim 2\"]}

If valid, suggestions can be empty. If invalid, provide 2-3 specific claim \
suggestions about the topic.";

/// Build the query-generation prompt for a claim.
pub fn format_query_prompt(claim: &str) -> Prompt {
    Prompt::new(
        QUERY_PROMPT,
        format!(
            "Health claim: \"{claim}\"\n\n\
             Generate 2-3 literature search queries to find the best scientific \
             evidence about this claim."
        ),
    )
}

/// Build the batch scoring prompt for a study list.
pub fn format_score_prompt(studies: &[Study]) -> Prompt {
    let mut listing = String::new();
    for (i, study) in studies.iter().enumerate() {
        listing.push_str(&format!(
            "Study {}:\n\
             - Title: {}\n\
             - Journal: {} ({})\n\
             - Type: {}\n\
             - Sample Size: n={}\n\n",
            i + 1,
            study.title,
            study.journal,
            study.year,
            study.study_type,
            study.sample_size,
        ));
    }

    Prompt::new(
        SCORE_PROMPT,
        format!(
            "Score these {} studies from 0-10:\n\n{listing}",
            studies.len()
        ),
    )
}

/// Build the synthesis prompt from the claim and top studies.
pub fn format_synthesis_prompt(claim: &str, studies: &[Study]) -> Prompt {
    Prompt::new(
        SYNTHESIS_PROMPT,
        format!(
            "Health Claim: \"{claim}\"\n\n\
             Studies to Analyze:\n{}\n\n\
             Analyze these studies and generate a verdict about the health claim.",
            studies_context(studies)
        ),
    )
}

/// Build the validation prompt for a claim.
pub fn format_validation_prompt(claim: &str) -> Prompt {
    Prompt::new(
        VALIDATION_PROMPT,
        format!("Analyze this health claim:\n\"{claim}\""),
    )
}

/// Format studies into synthesis context, abstracts truncated to 500 chars.
fn studies_context(studies: &[Study]) -> String {
    studies
        .iter()
        .enumerate()
        .map(|(i, study)| {
            let score = study.quality_score.unwrap_or(0.0);
            let abstract_excerpt: String = study.abstract_text.chars().take(500).collect();
            format!(
                "Study {} [Quality: {score:.1}/10]:\n\
                 - Title: {}\n\
                 - Authors: {}\n\
                 - Journal: {} ({})\n\
                 - Study Type: {}\n\
                 - Sample Size: n={}\n\
                 - Abstract: {abstract_excerpt}\n\
                 - URL: {}",
                i + 1,
                study.title,
                study.authors,
                study.journal,
                study.year,
                study.study_type,
                study.sample_size,
                study.url,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Strip a markdown code fence (with optional `json` tag) from a response.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start();
    match rest.strip_suffix("```") {
        Some(body) => body.trim(),
        None => rest.trim(),
    }
}

//! Typed errors for the evidence pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Collaborator failures are
//! modeled as a small closed set of variants so the resilience layer never
//! has to inspect provider-specific exception hierarchies.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the pipeline and its entry points.
#[derive(Debug, Error)]
pub enum VerityError {
    /// Generation service call failed
    #[error("generation service error: {0}")]
    Generation(#[from] GenerationError),

    /// Upstream provider rate limits exhausted all retries.
    ///
    /// Distinct from a generic failure: callers translate this into a
    /// "try again later" response rather than an error page.
    #[error("provider capacity exceeded, please try again later")]
    ProviderExhausted,

    /// A client exceeded its request budget at the pipeline entry point
    #[error("too many requests, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// Claim failed the pre-filter validation
    #[error("claim rejected: {reason}")]
    InvalidClaim {
        reason: String,
        suggestions: Vec<String>,
    },

    /// Result store operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Errors from the text-generation collaborator.
///
/// The closed taxonomy from which the retry wrapper decides what to do:
/// only `RateLimited` is retried, everything else propagates to the stage
/// fallbacks.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Service unreachable or returned a transport-level failure
    #[error("generation service unavailable: {0}")]
    Unavailable(String),

    /// Completion could not be parsed into the expected structure
    #[error("malformed completion: {0}")]
    MalformedOutput(String),

    /// Provider signalled a rate limit, possibly with a suggested wait
    #[error("rate limited by provider")]
    RateLimited { retry_after: Option<Duration> },
}

/// Errors from the literature-search collaborator.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Service unreachable or a call failed
    #[error("search service unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, VerityError>;

/// Result type alias for generation-service calls.
pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// Result type alias for literature-search calls.
pub type SearchServiceResult<T> = std::result::Result<T, SearchError>;

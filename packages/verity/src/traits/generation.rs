//! Text-generation collaborator seam.
//!
//! The pipeline treats the generation service as a black box: structured
//! prompt in, free-text completion out. Failures are expressed through the
//! closed [`GenerationError`](crate::error::GenerationError) taxonomy so the
//! resilience layer stays decoupled from any particular provider SDK.

use async_trait::async_trait;

use crate::error::GenerationResult;

/// A structured prompt: system framing plus user content.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Create a prompt.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Generation service abstraction.
///
/// Implementations wrap a specific provider and its transport. No ordering
/// or statefulness is assumed between calls.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    /// Produce a text completion for a structured prompt.
    async fn complete(&self, prompt: &Prompt) -> GenerationResult<String>;
}

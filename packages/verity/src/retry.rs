//! Retry-with-backoff wrapper for generation-service calls.
//!
//! Only provider rate limits are retried. The provider's suggested wait is
//! honored when present; otherwise the delay doubles per attempt (2s, 4s,
//! 8s with the default policy). Exhausting all retries surfaces the
//! distinct [`VerityError::ProviderExhausted`] condition so callers can
//! answer "try again later" instead of a generic failure.

use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use crate::error::{GenerationError, Result, VerityError};
use crate::traits::generation::{Prompt, TextGeneration};

/// Backoff schedule for generation-service retries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries beyond the initial attempt. Default: 3.
    pub max_retries: u32,

    /// Backoff base; attempt `i` waits `base * 2^(i+1)`. Default: 1s.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy with a custom retry count and the default backoff base.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Policy with zero delays, for tests.
    pub fn no_delay() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::ZERO,
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt + 1)
    }
}

/// Call the generation service, retrying on provider rate limits.
pub async fn complete_with_retry<G: TextGeneration + ?Sized>(
    generation: &G,
    prompt: &Prompt,
    policy: &RetryPolicy,
) -> Result<String> {
    for attempt in 0..=policy.max_retries {
        match generation.complete(prompt).await {
            Ok(completion) => return Ok(completion),
            Err(GenerationError::RateLimited { retry_after }) => {
                if attempt == policy.max_retries {
                    return Err(VerityError::ProviderExhausted);
                }

                let wait = retry_after.unwrap_or_else(|| policy.backoff(attempt));
                warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    wait_ms = wait.as_millis() as u64,
                    "generation provider rate limited, backing off"
                );
                sleep(wait).await;
            }
            Err(other) => return Err(other.into()),
        }
    }

    Err(VerityError::ProviderExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGeneration;

    fn prompt() -> Prompt {
        Prompt::new("system", "user")
    }

    #[tokio::test]
    async fn succeeds_without_retry() {
        let generation = MockGeneration::new().with_response("hello");

        let out = complete_with_retry(&generation, &prompt(), &RetryPolicy::no_delay())
            .await
            .unwrap();
        assert_eq!(out, "hello");
        assert_eq!(generation.call_count(), 1);
    }

    #[tokio::test]
    async fn retries_through_rate_limits() {
        let generation = MockGeneration::new()
            .with_error(GenerationError::RateLimited { retry_after: None })
            .with_error(GenerationError::RateLimited {
                retry_after: Some(Duration::ZERO),
            })
            .with_response("eventually");

        let out = complete_with_retry(&generation, &prompt(), &RetryPolicy::no_delay())
            .await
            .unwrap();
        assert_eq!(out, "eventually");
        assert_eq!(generation.call_count(), 3);
    }

    #[tokio::test]
    async fn exhaustion_is_a_distinct_condition() {
        let generation = MockGeneration::new()
            .with_error(GenerationError::RateLimited { retry_after: None })
            .with_error(GenerationError::RateLimited { retry_after: None })
            .with_error(GenerationError::RateLimited { retry_after: None })
            .with_error(GenerationError::RateLimited { retry_after: None });

        let err = complete_with_retry(&generation, &prompt(), &RetryPolicy::no_delay())
            .await
            .unwrap_err();
        assert!(matches!(err, VerityError::ProviderExhausted));
        // Initial attempt plus three retries.
        assert_eq!(generation.call_count(), 4);
    }

    #[tokio::test]
    async fn non_rate_limit_errors_propagate_immediately() {
        let generation =
            MockGeneration::new().with_error(GenerationError::Unavailable("down".into()));

        let err = complete_with_retry(&generation, &prompt(), &RetryPolicy::no_delay())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VerityError::Generation(GenerationError::Unavailable(_))
        ));
        assert_eq!(generation.call_count(), 1);
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(2));
        assert_eq!(policy.backoff(1), Duration::from_secs(4));
        assert_eq!(policy.backoff(2), Duration::from_secs(8));
    }
}

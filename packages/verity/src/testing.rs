//! In-memory collaborator doubles for unit and integration tests.
//!
//! These are deliberately simple scripted fakes, not a mocking framework:
//! `MockSearch` maps queries to canned records, `MockGeneration` plays back
//! a queue of responses, and `ManualClock` lets limiter tests move time by
//! hand.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::{GenerationError, GenerationResult, SearchError, SearchServiceResult};
use crate::limiter::Clock;
use crate::traits::generation::{Prompt, TextGeneration};
use crate::traits::search::LiteratureSearch;
use crate::types::record::RawRecord;

/// Scripted literature search. Unknown queries return no results; queries
/// registered with [`with_failure`](MockSearch::with_failure) fail.
#[derive(Default)]
pub struct MockSearch {
    results: HashMap<String, Vec<RawRecord>>,
    failures: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the records a query returns.
    pub fn with_records(mut self, query: impl Into<String>, records: Vec<RawRecord>) -> Self {
        self.results.insert(query.into(), records);
        self
    }

    /// Make a query fail with a service-unavailable error.
    pub fn with_failure(mut self, query: impl Into<String>) -> Self {
        self.failures.insert(query.into());
        self
    }

    /// Queries issued so far, in order.
    pub fn queries_seen(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LiteratureSearch for MockSearch {
    async fn search(&self, query: &str, max_results: usize) -> SearchServiceResult<Vec<String>> {
        self.calls.lock().unwrap().push(query.to_string());

        if self.failures.contains(query) {
            return Err(SearchError::Unavailable("scripted failure".into()));
        }

        let ids = self
            .results
            .get(query)
            .map(|records| {
                records
                    .iter()
                    .take(max_results)
                    .map(|r| r.record_id.clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }

    async fn fetch(&self, ids: &[String]) -> SearchServiceResult<Vec<RawRecord>> {
        let mut records = Vec::new();
        for id in ids {
            let found = self
                .results
                .values()
                .flatten()
                .find(|r| &r.record_id == id);
            if let Some(record) = found {
                records.push(record.clone());
            }
        }
        Ok(records)
    }
}

/// Scripted text generation. Responses play back in FIFO order; an empty
/// queue fails the call, which exercises the degraded paths.
#[derive(Default)]
pub struct MockGeneration {
    responses: Mutex<Vec<GenerationResult<String>>>,
    calls: Mutex<Vec<Prompt>>,
}

impl MockGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful completion.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(Ok(response.into()));
        self
    }

    /// Queue an error.
    pub fn with_error(self, error: GenerationError) -> Self {
        self.responses.lock().unwrap().push(Err(error));
        self
    }

    /// Every prompt seen so far, in order.
    pub fn calls(&self) -> Vec<Prompt> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGeneration for MockGeneration {
    async fn complete(&self, prompt: &Prompt) -> GenerationResult<String> {
        self.calls.lock().unwrap().push(prompt.clone());

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(GenerationError::Unavailable("no scripted response".into()));
        }
        responses.remove(0)
    }
}

/// A clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

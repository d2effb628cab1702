//! End-to-end pipeline and service tests against scripted collaborators.

use std::time::Duration;

use verity::stores::MemoryResultStore;
use verity::testing::{ManualClock, MockGeneration, MockSearch};
use verity::{
    Pipeline, RateLimiter, RawRecord, RetryPolicy, Verdict, Verity, VerityError,
    NO_EVIDENCE_SUMMARY, SEARCH_UNAVAILABLE,
};

fn record(id: u32) -> RawRecord {
    RawRecord::new(id.to_string(), format!("Randomized controlled trial {id}"))
        .with_author("Smith", "J")
        .with_journal("J Evid Med")
        .with_year("2023")
        .with_abstract(format!("RESULTS: effect observed in trial {id}."))
}

fn scores_json(count: usize) -> String {
    let entries: Vec<String> = (1..=count)
        .map(|i| format!(r#"{{"score": {}.0, "rationale": "entry {i}"}}"#, i))
        .collect();
    format!(r#"{{"scores": [{}]}}"#, entries.join(", "))
}

#[tokio::test]
async fn full_run_deduplicates_ranks_and_synthesizes() {
    // Three queries, six records each, with overlap: 5/6 shared between
    // q1 and q2, 9/10 shared between q2 and q3. 14 unique records.
    let search = MockSearch::new()
        .with_records("q1", (1..=6).map(record).collect())
        .with_records("q2", (5..=10).map(record).collect())
        .with_records("q3", (9..=14).map(record).collect());
    let generation = MockGeneration::new()
        .with_response(r#"{"queries": ["q1", "q2", "q3"]}"#)
        .with_response(&scores_json(14))
        .with_response(r#"{"verdict": "Supported", "summary": "**Bottom Line:** it works."}"#);

    let pipeline = Pipeline::new(search, generation);
    let state = pipeline.run("the intervention works").await;

    assert_eq!(state.raw_studies.len(), 14);
    assert_eq!(state.scored_studies.len(), 14);
    assert_eq!(state.top_studies.len(), 5);

    // Scores ascend with record id, so the top five are 14 down to 10.
    let top_ids: Vec<&str> = state
        .top_studies
        .iter()
        .map(|s| s.record_id.as_str())
        .collect();
    assert_eq!(top_ids, vec!["14", "13", "12", "11", "10"]);

    assert_eq!(state.verdict, Some(Verdict::Supported));
    assert_eq!(state.verdict_emoji.as_deref(), Some("✓"));
    assert!(state.search_error.is_none());
}

#[tokio::test]
async fn no_evidence_short_circuits_synthesis() {
    let search = MockSearch::new().with_records("q1", vec![]);
    let generation = MockGeneration::new().with_response(r#"{"queries": ["q1"]}"#);

    let pipeline = Pipeline::new(search, generation);
    let state = pipeline.run("an unstudied claim").await;

    assert_eq!(state.verdict, Some(Verdict::Inconclusive));
    assert_eq!(state.summary.as_deref(), Some(NO_EVIDENCE_SUMMARY));
    // Only the query-generation call was made; scoring and synthesis
    // were skipped.
    assert_eq!(state.top_studies.len(), 0);
}

#[tokio::test]
async fn search_outage_is_recorded_but_still_yields_a_verdict() {
    let search = MockSearch::new().with_failure("q1").with_failure("q2");
    let generation = MockGeneration::new().with_response(r#"{"queries": ["q1", "q2"]}"#);

    let pipeline = Pipeline::new(search, generation).with_retry_policy(RetryPolicy::no_delay());
    let state = pipeline.run("zinc shortens colds").await;

    assert_eq!(state.search_error.as_deref(), Some(SEARCH_UNAVAILABLE));
    assert_eq!(state.verdict, Some(Verdict::Inconclusive));
    assert!(state.summary.is_some());
}

#[tokio::test]
async fn short_score_batch_falls_back_for_the_remainder() {
    let search = MockSearch::new().with_records("q1", (1..=5).map(record).collect());
    let generation = MockGeneration::new()
        .with_response(r#"{"queries": ["q1"]}"#)
        .with_response(&scores_json(3))
        .with_response(r#"{"verdict": "Partially Supported", "summary": "mixed"}"#);

    let pipeline = Pipeline::new(search, generation);
    let state = pipeline.run("the intervention works").await;

    assert_eq!(state.scored_studies.len(), 5);
    for study in &state.scored_studies {
        let score = study.quality_score.expect("every study is scored");
        assert!((0.0..=10.0).contains(&score));
    }
    assert_eq!(state.verdict, Some(Verdict::PartiallySupported));
    assert_eq!(state.verdict_emoji.as_deref(), Some("⚖️"));
}

#[tokio::test]
async fn service_caches_the_first_result_and_serves_the_second_from_cache() {
    let search = MockSearch::new().with_records("q1", vec![record(1)]);
    let generation = MockGeneration::new()
        .with_response(r#"{"queries": ["q1"]}"#)
        .with_response(&scores_json(1))
        .with_response(r#"{"verdict": "Strongly Supported", "summary": "works"}"#);

    let pipeline = Pipeline::new(search, generation);
    let service = Verity::new(pipeline, MemoryResultStore::new());

    let first = service.check("198.51.100.1", "Creatine improves strength").await.unwrap();
    assert!(!first.cache_hit);
    assert_eq!(first.cache_version, Some(1));
    assert_eq!(first.verdict_emoji, "✅");

    // Different casing, same normalized key. The generation queue is
    // drained, so anything but a cache hit would degrade the verdict.
    let second = service
        .check("198.51.100.1", "creatine improves strength!")
        .await
        .unwrap();
    assert!(second.cache_hit);
    assert_eq!(second.verdict, Verdict::StronglySupported);
    assert_eq!(second.summary, "works");
}

#[tokio::test]
async fn service_rejects_clients_over_their_budget() {
    let clock = ManualClock::new();
    let limiter = RateLimiter::with_clock(2, Duration::from_secs(60), clock.clone());
    let pipeline = Pipeline::new(MockSearch::new(), MockGeneration::new())
        .with_retry_policy(RetryPolicy::no_delay());
    let service = Verity::with_limiter(pipeline, MemoryResultStore::new(), limiter);

    service.check("203.0.113.9", "claim one").await.unwrap();
    service.check("203.0.113.9", "claim two").await.unwrap();

    let err = service.check("203.0.113.9", "claim three").await.unwrap_err();
    match err {
        VerityError::RateLimited { retry_after } => {
            assert!(retry_after <= Duration::from_secs(60));
        }
        other => panic!("expected a rate-limit rejection, got {other}"),
    }

    // Other clients are unaffected.
    assert!(service.check("203.0.113.10", "claim four").await.is_ok());
}

//! Batch engine behavior against a scripted upstream

use crate::common::{empty_body, listing_body, ScriptedExecutor};
use rust_decimal::Decimal;
use serde_json::json;
use skin_arbitrage::downloader::{BatchConfig, BatchScheduler};
use skin_arbitrage::fetcher::SearchResponse;
use skin_arbitrage::identifier::TemplateId;
use skin_arbitrage::shutdown::ShutdownCoordinator;
use skin_arbitrage::{run_batch, FailureReason, FetchOutcome, SENTINEL_PRICE};
use std::collections::HashSet;
use std::time::Duration;

/// Timer resolution slack for paused-clock measurements
const SLACK: Duration = Duration::from_millis(5);

fn ids(raw: &[&str]) -> Vec<TemplateId> {
    raw.iter().map(|s| TemplateId::parse(s).unwrap()).collect()
}

fn numbered_ids(n: usize) -> Vec<TemplateId> {
    (0..n).map(|i| TemplateId::from(i as i64 + 1)).collect()
}

fn scheduler(executor: std::sync::Arc<ScriptedExecutor>, config: BatchConfig) -> BatchScheduler<ScriptedExecutor> {
    BatchScheduler::new(executor, config).with_shutdown(ShutdownCoordinator::shared())
}

#[tokio::test(start_paused = true)]
async fn test_mixed_outcomes_example() {
    let executor = ScriptedExecutor::new(SearchResponse::Fatal(404))
        .script("A", vec![SearchResponse::Ok(listing_body("A", "10"))])
        .script("B", vec![SearchResponse::Retryable(500)])
        .script("C", vec![SearchResponse::Ok(listing_body("C", "5"))])
        .shared();

    let input = ids(&["A", "B", "C"]);
    let report = scheduler(executor.clone(), BatchConfig::default())
        .run(&input)
        .await;
    let results = report.results;

    assert_eq!(results.len(), 3);
    let a = results.get(&input[0]).unwrap();
    let b = results.get(&input[1]).unwrap();
    let c = results.get(&input[2]).unwrap();
    assert_eq!(a.price(), Decimal::from(10));
    assert_eq!(b.price(), SENTINEL_PRICE);
    assert_eq!(c.price(), Decimal::from(5));

    assert_eq!(
        b.failure_reason(),
        Some(&FailureReason::RetriesExhausted { last_status: 500 })
    );
    // first attempt plus the full retry budget
    assert_eq!(b.attempts(), 11);
    assert_eq!(executor.calls_for(&input[1]).len(), 11);
    assert!(!report.cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_completeness_regardless_of_failures() {
    let executor = ScriptedExecutor::always_listing("12.5")
        .script("2", vec![SearchResponse::Fatal(403)])
        .script("3", vec![SearchResponse::TransportError("connection reset".into())])
        .script("4", vec![SearchResponse::Ok(empty_body())])
        .script("5", vec![SearchResponse::Retryable(429)])
        .shared();

    let input = numbered_ids(40);
    let results = run_batch(executor, &input, 100).await;

    assert_eq!(results.len(), input.len());
    let seen: HashSet<&TemplateId> = results.iter().map(FetchOutcome::identifier).collect();
    assert_eq!(seen.len(), input.len());
    assert_eq!(results.failure_count(), 4);
    assert_eq!(results.success_count(), 36);
    assert!(results
        .iter()
        .filter(|o| !o.is_success())
        .all(|o| o.price() == SENTINEL_PRICE));
}

#[tokio::test(start_paused = true)]
async fn test_empty_input_returns_empty_set() {
    let executor = ScriptedExecutor::always_listing("1").shared();
    let results = run_batch(executor.clone(), &[], 100).await;
    assert!(results.is_empty());
    assert_eq!(executor.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_sentinel_distinct_from_real_prices() {
    let executor = ScriptedExecutor::new(SearchResponse::Retryable(429))
        .script("7", vec![SearchResponse::Ok(listing_body("Real", "1.01"))])
        .shared();

    let input = ids(&["6", "7"]);
    let results = run_batch(executor, &input, 100).await;

    let failed = results.get(&input[0]).unwrap();
    assert_eq!(failed.price(), SENTINEL_PRICE);
    assert!(!failed.is_success());

    let priced: Vec<_> = results.priced().collect();
    assert_eq!(priced, vec![(&input[1], Decimal::new(101, 2))]);
}

#[tokio::test(start_paused = true)]
async fn test_no_retry_on_shape_failure() {
    let executor = ScriptedExecutor::new(SearchResponse::Ok(empty_body()))
        .script("2", vec![SearchResponse::Ok(json!({ "Code": 0, "Data": null }))])
        .script(
            "3",
            vec![SearchResponse::Ok(json!({
                "Data": { "CommodityList": [ { "CommodityName": "X", "Price": "n/a", "UserNickName": "s" } ] }
            }))],
        )
        .shared();

    let input = ids(&["1", "2", "3"]);
    let results = run_batch(executor.clone(), &input, 100).await;

    for id in &input {
        let outcome = results.get(id).unwrap();
        assert!(matches!(outcome.failure_reason(), Some(FailureReason::NoListing(_))));
        assert_eq!(outcome.attempts(), 1);
        assert_eq!(executor.calls_for(id).len(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_retry_on_transient_then_success() {
    let executor = ScriptedExecutor::always_listing("3")
        .script(
            "44172",
            vec![
                SearchResponse::Retryable(429),
                SearchResponse::Retryable(429),
                SearchResponse::Retryable(429),
                SearchResponse::Ok(listing_body("Glock-18 | Vogue", "88.8")),
            ],
        )
        .shared();

    let input = ids(&["44172"]);
    let results = run_batch(executor.clone(), &input, 100).await;

    let outcome = results.get(&input[0]).unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.attempts(), 4);
    assert_eq!(outcome.price(), Decimal::new(888, 1));

    let calls = executor.calls_for(&input[0]);
    assert_eq!(calls.len(), 4);
    for pair in calls.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= Duration::from_secs(4), "gap {gap:?} below backoff floor");
        assert!(gap <= Duration::from_secs(6) + SLACK, "gap {gap:?} above backoff ceiling");
    }
}

#[tokio::test(start_paused = true)]
async fn test_fatal_and_transport_not_retried() {
    let executor = ScriptedExecutor::new(SearchResponse::Fatal(502))
        .script("t", vec![SearchResponse::TransportError("timed out".into())])
        .shared();

    let input = ids(&["f", "t"]);
    let results = run_batch(executor.clone(), &input, 100).await;

    assert_eq!(
        results.get(&input[0]).unwrap().failure_reason(),
        Some(&FailureReason::HttpStatus(502))
    );
    assert!(matches!(
        results.get(&input[1]).unwrap().failure_reason(),
        Some(FailureReason::Transport(_))
    ));
    assert_eq!(executor.total_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_launch_pacing_pauses_between_cohorts() {
    let executor = ScriptedExecutor::always_listing("4").shared();
    let input = numbered_ids(250);

    let report = scheduler(executor.clone(), BatchConfig::default().with_cohort_size(100))
        .run(&input)
        .await;

    assert_eq!(report.results.len(), 250);
    assert_eq!(report.cooldowns.len(), 2);
    for pause in &report.cooldowns {
        assert!(*pause >= Duration::from_secs(65) && *pause <= Duration::from_secs(70));
    }

    let first_calls = executor.first_calls();
    let cohort_window = |range: std::ops::Range<usize>| {
        let times: Vec<_> = input[range].iter().map(|id| first_calls[id]).collect();
        (*times.iter().min().unwrap(), *times.iter().max().unwrap())
    };
    let (c1_start, c1_end) = cohort_window(0..100);
    let (c2_start, c2_end) = cohort_window(100..200);
    let (c3_start, _) = cohort_window(200..250);

    for (prev_end, next_start) in [(c1_end, c2_start), (c2_end, c3_start)] {
        let gap = next_start - prev_end;
        assert!(gap >= Duration::from_secs(65), "cohort gap {gap:?} too short");
        assert!(gap <= Duration::from_secs(70) + SLACK, "cohort gap {gap:?} too long");
    }
    assert!(c1_end - c1_start < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_exact_cohort_multiple_has_no_trailing_pause() {
    let executor = ScriptedExecutor::always_listing("4").shared();
    let report = scheduler(executor, BatchConfig::default().with_cohort_size(100))
        .run(&numbered_ids(200))
        .await;

    assert_eq!(report.results.len(), 200);
    assert_eq!(report.cooldowns.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_does_not_block_other_identifiers() {
    let executor = ScriptedExecutor::always_listing("2")
        .script("slow", vec![SearchResponse::Retryable(429), SearchResponse::Ok(listing_body("S", "9"))])
        .shared();

    let input = ids(&["slow", "fast1", "fast2"]);
    let results = run_batch(executor.clone(), &input, 100).await;
    assert_eq!(results.success_count(), 3);

    let slow_first = executor.calls_for(&input[0])[0];
    let fast_first = executor.calls_for(&input[2])[0];
    assert!(fast_first - slow_first < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_custom_retry_budget() {
    let executor = ScriptedExecutor::new(SearchResponse::Retryable(504)).shared();
    let input = ids(&["1"]);

    let report = scheduler(executor.clone(), BatchConfig::default().with_max_retries(2))
        .run(&input)
        .await;

    let outcome = report.results.get(&input[0]).unwrap();
    assert_eq!(outcome.attempts(), 3);
    assert_eq!(
        outcome.failure_reason(),
        Some(&FailureReason::RetriesExhausted { last_status: 504 })
    );
}

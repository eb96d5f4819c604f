//! RetryPolicy driven directly, outside the scheduler

use crate::common::{listing_body, ScriptedExecutor};
use skin_arbitrage::downloader::{RetryConfig, RetryPolicy};
use skin_arbitrage::fetcher::SearchResponse;
use skin_arbitrage::identifier::TemplateId;
use skin_arbitrage::shutdown::ShutdownCoordinator;
use skin_arbitrage::FailureReason;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_zero_budget_fails_on_first_transient() {
    let executor = ScriptedExecutor::new(SearchResponse::Retryable(429));
    let policy = RetryPolicy::new(RetryConfig::default().with_max_retries(0));
    let id = TemplateId::from(1);

    let outcome = policy.run(&executor, &id, &ShutdownCoordinator::new()).await;
    assert_eq!(outcome.attempts(), 1);
    assert_eq!(
        outcome.failure_reason(),
        Some(&FailureReason::RetriesExhausted { last_status: 429 })
    );
}

#[tokio::test(start_paused = true)]
async fn test_custom_backoff_range() {
    let executor = ScriptedExecutor::new(SearchResponse::Ok(listing_body("X", "2")))
        .script(
            "9",
            vec![SearchResponse::Retryable(500), SearchResponse::Ok(listing_body("X", "2"))],
        );
    let policy = RetryPolicy::new(
        RetryConfig::default().with_backoff(Duration::from_millis(100), Duration::from_millis(100)),
    );
    let id = TemplateId::from(9);

    let outcome = policy.run(&executor, &id, &ShutdownCoordinator::new()).await;
    assert!(outcome.is_success());

    let calls = executor.calls_for(&id);
    let gap = calls[1] - calls[0];
    assert!(gap >= Duration::from_millis(100) && gap <= Duration::from_millis(105));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_first_attempt() {
    let executor = ScriptedExecutor::always_listing("2");
    let shutdown = ShutdownCoordinator::new();
    shutdown.request_shutdown();

    let outcome = RetryPolicy::default()
        .run(&executor, &TemplateId::from(3), &shutdown)
        .await;
    assert_eq!(outcome.failure_reason(), Some(&FailureReason::Cancelled));
    assert_eq!(outcome.attempts(), 0);
    assert_eq!(executor.total_calls(), 0);
}

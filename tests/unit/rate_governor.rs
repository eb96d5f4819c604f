//! RateGovernor pacing decisions and interrupted cooldowns

use skin_arbitrage::downloader::{GovernorConfig, RateGovernor};
use skin_arbitrage::shutdown::ShutdownCoordinator;
use std::time::Duration;
use tokio::time::Instant;

#[test]
fn test_small_cohorts() {
    let mut governor = RateGovernor::new(GovernorConfig::default().with_cohort_size(3), 10);
    let pauses: Vec<usize> = (1..=10)
        .filter(|_| governor.record_launch().is_some())
        .collect();
    assert_eq!(pauses, vec![3, 6, 9]);
    assert_eq!(governor.launched(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_cut_short_by_shutdown() {
    let shutdown = ShutdownCoordinator::shared();
    let mut governor = RateGovernor::new(GovernorConfig::default().with_cohort_size(1), 2);

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            shutdown.request_shutdown();
        }
    });

    let started = Instant::now();
    let cooldown = governor.after_launch(&shutdown).await;
    assert!(cooldown.is_some());
    assert!(started.elapsed() < Duration::from_secs(6));
}

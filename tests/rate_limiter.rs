use futures::future::join_all;
use source_atlas::rate_limit::RateLimiter;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_first_grant_is_immediate() {
    let limiter = RateLimiter::from_millis(1000);
    let before = tokio::time::Instant::now();
    let granted = limiter.acquire().await;
    assert_eq!(granted, before);
}

#[tokio::test(start_paused = true)]
async fn test_consecutive_grants_respect_interval() {
    let limiter = RateLimiter::from_millis(1000);
    let first = limiter.acquire().await;
    let second = limiter.acquire().await;
    assert!(second - first >= Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_no_wait_once_interval_has_passed() {
    let limiter = RateLimiter::from_millis(100);
    let first = limiter.acquire().await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    let second = limiter.acquire().await;
    let gap = second - first;
    assert!(gap >= Duration::from_millis(300) && gap < Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_are_serialized() {
    let limiter = Arc::new(RateLimiter::from_millis(250));
    let tasks = (0..6).map(|_| {
        let limiter = Arc::clone(&limiter);
        tokio::spawn(async move { limiter.acquire().await })
    });
    let mut grants: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.expect("task completes"))
        .collect();
    grants.sort();

    assert_eq!(grants.len(), 6);
    for pair in grants.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(250));
    }
}

#[tokio::test]
async fn test_zero_interval_never_waits() {
    let limiter = RateLimiter::new(Duration::ZERO);
    assert_eq!(limiter.min_interval(), Duration::ZERO);
    for _ in 0..10 {
        limiter.acquire().await;
    }
}

//! Pool acquisition under contention.
//!
//! With every connection lent out, a further acquisition must fail with
//! `ExhaustedError` once the acquire timeout elapses instead of blocking
//! indefinitely, and must succeed as soon as a connection comes back.

#[path = "helpers.rs"]
mod helpers;

use helpers::create_test_pool;
use scoreboard::{AddOutcome, DatabaseError, Game};
use std::time::Instant;
use tokio::time::Duration;

#[tokio::test]
async fn test_acquire_beyond_pool_size_fails_fast() {
    let (_dir, pool) = create_test_pool(2, Duration::from_millis(200)).await;

    let first = pool.acquire().await.expect("first connection");
    let second = pool.acquire().await.expect("second connection");

    let start = Instant::now();
    let err = pool.acquire().await.expect_err("pool should be exhausted");
    let elapsed = start.elapsed();

    assert!(
        matches!(err, DatabaseError::ExhaustedError { timeout } if timeout == Duration::from_millis(200)),
        "unexpected error: {err}"
    );
    assert!(elapsed >= Duration::from_millis(150), "returned too early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "blocked too long: {elapsed:?}");

    drop(first);
    drop(second);
}

#[tokio::test]
async fn test_blocked_acquire_succeeds_after_release() {
    let (_dir, pool) = create_test_pool(1, Duration::from_secs(5)).await;
    let held = pool.acquire().await.expect("only connection");

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.acquire().await.map(|_| ()) })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!waiter.is_finished());

    pool.release(held).await;
    let result = tokio::time::timeout(Duration::from_secs(2), waiter)
        .await
        .expect("waiter should be woken by the release")
        .expect("task should not panic");
    assert!(result.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_operations_share_a_small_pool() {
    let (_dir, pool) = create_test_pool(2, Duration::from_secs(5)).await;
    let repository = helpers::test_repository(&pool, false);

    let handles: Vec<_> = (0..8u8)
        .map(|i| {
            let repository = repository.clone();
            let player = format!("{}player", (b'a' + i) as char);
            tokio::spawn(async move {
                repository
                    .add_score(Game::Uno, &player, i64::from(i))
                    .await
            })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        let outcome = result
            .expect("task should not panic")
            .expect("insert should succeed");
        assert_eq!(outcome, AddOutcome::Inserted);
    }
    assert_eq!(helpers::count_rows(&pool, "UNO").await, 8);
    assert!(pool.size() <= 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_codes_are_not_errors() {
    let (_dir, pool) = create_test_pool(4, Duration::from_secs(5)).await;
    let repository = helpers::test_repository(&pool, false);

    for round in 0..20 {
        let handles: Vec<_> = ["Kim", "Kai", "Kat", "Ken"]
            .into_iter()
            .map(|name| {
                let repository = repository.clone();
                tokio::spawn(async move { repository.add_score(Game::Chess, name, round).await })
            })
            .collect();

        for result in futures::future::join_all(handles).await {
            result
                .expect("task should not panic")
                .expect("duplicate code must not fail");
        }
    }

    assert_eq!(helpers::count_rows(&pool, "Chess").await, 1);
}

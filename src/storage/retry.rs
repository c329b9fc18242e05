//! Reconnect-and-retry wrapper for pooled operations.
//!
//! `RetryGuard::run` borrows a connection, runs the operation on it, and on
//! a connection-level failure discards that connection, waits the reconnect
//! delay, borrows a fresh one and runs the operation exactly once more.
//! Statement errors, lookup errors and pool exhaustion are never retried.

use std::time::Duration;

use futures::future::BoxFuture;
use log::{info, warn};
use sqlx::SqliteConnection;
use tokio_retry::strategy::FixedInterval;

use crate::config::RETRY_MAX_REATTEMPTS;
use crate::error_handling::DatabaseError;
use crate::storage::pool::ConnectionPool;

/// Future returned by an operation run under the guard.
///
/// Operations receive the borrowed connection and must not hold on to it
/// past the returned future.
pub type ConnFuture<'c, T> = BoxFuture<'c, Result<T, DatabaseError>>;

/// Applies the single reconnect-and-retry policy to pooled operations.
#[derive(Clone, Debug)]
pub struct RetryGuard {
    pool: ConnectionPool,
    reconnect_delay: Duration,
}

impl RetryGuard {
    /// Creates a guard drawing connections from `pool`.
    pub fn new(pool: ConnectionPool, reconnect_delay: Duration) -> Self {
        Self {
            pool,
            reconnect_delay,
        }
    }

    /// Delays before each re-execution. `take` bounds the guard to one retry.
    fn reconnect_strategy(&self) -> impl Iterator<Item = Duration> {
        FixedInterval::new(self.reconnect_delay).take(RETRY_MAX_REATTEMPTS)
    }

    /// Runs `op` on a pooled connection with at most one reconnect-and-retry.
    ///
    /// `op` is called once, or twice if the first call fails with a
    /// `ConnectionError`. If the second call fails too, its error is returned
    /// and the first one is only logged. Every statement `op` issues runs on
    /// the single connection it was handed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use scoreboard::{RetryGuard, DatabaseError};
    /// # async fn example(guard: &RetryGuard) -> Result<(), DatabaseError> {
    /// let count: i64 = guard
    ///     .run("count players", |conn| {
    ///         Box::pin(async move {
    ///             Ok(sqlx::query_scalar("SELECT COUNT(*) FROM UNO")
    ///                 .fetch_one(&mut *conn)
    ///                 .await?)
    ///         })
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<T, F>(&self, label: &str, mut op: F) -> Result<T, DatabaseError>
    where
        F: for<'c> FnMut(&'c mut SqliteConnection) -> ConnFuture<'c, T>,
    {
        let mut delays = self.reconnect_strategy();
        let mut attempt = 1;
        loop {
            let mut handle = self.pool.acquire().await?;
            let err = match op(&mut *handle).await {
                Ok(value) => {
                    if attempt > 1 {
                        info!("{label}: succeeded after reconnect");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_connection_error() => e,
                Err(e) => return Err(e),
            };

            handle.mark_broken();
            self.pool.release(handle).await;

            match delays.next() {
                Some(delay) => {
                    warn!("{label}: connection error: {err}. Reconnecting in {delay:?}...");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    warn!("{label}: connection error after reconnect, giving up: {err}");
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::create_test_pool;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn broken_pipe(msg: &str) -> DatabaseError {
        sqlx::Error::Io(io::Error::new(io::ErrorKind::BrokenPipe, msg.to_string())).into()
    }

    #[tokio::test]
    async fn test_reconnect_strategy_is_single_retry() {
        let (_dir, pool) = create_test_pool(1, Duration::from_millis(200)).await;
        let guard = RetryGuard::new(pool, Duration::from_millis(5));
        let delays: Vec<Duration> = guard.reconnect_strategy().collect();
        assert_eq!(delays, vec![Duration::from_millis(5)]);
    }

    #[tokio::test]
    async fn test_statement_error_is_not_retried() {
        let (_dir, pool) = create_test_pool(2, Duration::from_millis(200)).await;
        let guard = RetryGuard::new(pool, Duration::from_millis(1));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let result: Result<(), DatabaseError> = guard
            .run("bad sql", move |conn| {
                counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    sqlx::query("SELEC nonsense").execute(&mut *conn).await?;
                    Ok(())
                })
            })
            .await;

        assert!(matches!(result, Err(DatabaseError::StatementError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connection_error_retried_once() {
        let (_dir, pool) = create_test_pool(1, Duration::from_millis(200)).await;
        let guard = RetryGuard::new(pool, Duration::from_millis(1));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let result = guard
            .run("flaky", move |_conn| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    if n == 0 {
                        Err(broken_pipe("first"))
                    } else {
                        Ok(42)
                    }
                })
            })
            .await;

        assert_eq!(result.expect("second attempt succeeds"), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_failure_surfaces() {
        let (_dir, pool) = create_test_pool(1, Duration::from_millis(200)).await;
        let guard = RetryGuard::new(pool, Duration::from_millis(1));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let result: Result<(), DatabaseError> = guard
            .run("down", move |_conn| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    Err(broken_pipe(if n == 0 { "first failure" } else { "second failure" }))
                })
            })
            .await;

        let err = result.expect_err("both attempts fail");
        assert!(err.is_connection_error());
        assert!(err.to_string().contains("second failure"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_is_not_retried() {
        let (_dir, pool) = create_test_pool(1, Duration::from_millis(50)).await;
        let _held = pool.acquire().await.expect("acquire");
        let guard = RetryGuard::new(pool.clone(), Duration::from_millis(1));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let result: Result<(), DatabaseError> = guard
            .run("starved", move |_conn| {
                counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move { Ok(()) })
            })
            .await;

        assert!(matches!(result, Err(DatabaseError::ExhaustedError { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

// Shared test helpers for database setup and test data creation.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::time::Duration;

use scoreboard::{ensure_schema, ConnectionPool, PoolConfig, RetryGuard, ScoreRepository};
use tempfile::TempDir;

/// Creates a schema-bootstrapped pool on a fresh database file.
///
/// Keep the returned `TempDir` alive while the pool is in use.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_pool(size: u32, acquire_timeout: Duration) -> (TempDir, ConnectionPool) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("scoreboard.db");
    let pool = ConnectionPool::connect(PoolConfig {
        database_url: format!("sqlite://{}", db_path.display()),
        size,
        acquire_timeout,
    })
    .await
    .expect("Failed to create test database pool");
    ensure_schema(&pool).await.expect("Failed to create schema");
    (dir, pool)
}

/// Repository over `pool` with a near-zero reconnect delay.
#[allow(dead_code)]
pub fn test_repository(pool: &ConnectionPool, use_inventory: bool) -> ScoreRepository {
    ScoreRepository::new(
        RetryGuard::new(pool.clone(), Duration::from_millis(1)),
        use_inventory,
    )
}

/// Runs a raw statement on a pooled connection.
#[allow(dead_code)]
pub async fn exec(pool: &ConnectionPool, sql: &str) {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    sqlx::query(sql)
        .execute(&mut *conn)
        .await
        .expect("Failed to execute statement");
}

/// Counts the rows of `table`.
#[allow(dead_code)]
pub async fn count_rows(pool: &ConnectionPool, table: &str) -> i64 {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{table}\""))
        .fetch_one(&mut *conn)
        .await
        .expect("Failed to count rows")
}

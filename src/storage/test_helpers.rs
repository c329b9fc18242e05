//! Shared test helpers for storage-backed tests.
//!
//! Pools with more than one connection need a shared database file, because
//! every `sqlite::memory:` connection opens its own private database.

#[cfg(test)]
use std::time::Duration;

#[cfg(test)]
use tempfile::TempDir;

#[cfg(test)]
use crate::storage::{ensure_schema, ConnectionPool, PoolConfig};

/// Creates a schema-bootstrapped pool on a fresh temporary database file.
///
/// The returned `TempDir` must be kept alive for as long as the pool is used.
#[cfg(test)]
pub async fn create_test_pool(size: u32, acquire_timeout: Duration) -> (TempDir, ConnectionPool) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("scoreboard_test.db");
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

/// Inserts a score row directly, bypassing the repository.
#[cfg(test)]
pub async fn insert_score_row(pool: &ConnectionPool, table: &str, name: &str, score: i64) {
    let code: String = name.chars().take(1).collect();
    sqlx::query(&format!(
        "INSERT INTO \"{table}\" (Name, Score, Code) VALUES (?, ?, ?)"
    ))
    .bind(name)
    .bind(score)
    .bind(code)
    .execute(pool.inner())
    .await
    .expect("Failed to insert test score");
}

/// Counts rows of `table` directly, bypassing the repository.
#[cfg(test)]
pub async fn count_rows(pool: &ConnectionPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{table}\""))
        .fetch_one(pool.inner())
        .await
        .expect("Failed to count rows")
}

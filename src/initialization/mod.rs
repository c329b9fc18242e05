//! Application initialization and resource setup.
//!
//! Builds the shared resources every operation draws on: the logger, the
//! connection pool, and the retry guard wired to that pool. Construction
//! happens once at startup; `ConnectionPool::close` is the matching teardown.

mod logger;

use log::info;

use crate::config::Config;
use crate::error_handling::DatabaseError;
use crate::scores::{ConcurrentAggregator, ScoreRepository};
use crate::services::{ServiceProbe, ServiceStatusRecorder};
use crate::storage::{ConnectionPool, PoolConfig, RetryGuard};

pub use logger::init_logger_with;

/// Opens the connection pool described by `config`.
pub async fn init_pool(config: &Config) -> Result<ConnectionPool, DatabaseError> {
    let pool = ConnectionPool::connect(PoolConfig {
        database_url: config.database_url.clone(),
        size: config.pool_size,
        acquire_timeout: config.acquire_timeout,
    })
    .await?;
    info!(
        "Connection pool ready ({} connections, {:?} acquire timeout)",
        config.pool_size, config.acquire_timeout
    );
    Ok(pool)
}

/// Builds the retry guard used by every repository and recorder call.
pub fn init_retry_guard(pool: &ConnectionPool, config: &Config) -> RetryGuard {
    RetryGuard::new(pool.clone(), config.reconnect_delay)
}

/// Builds the score repository over `pool`.
pub fn init_repository(pool: &ConnectionPool, config: &Config) -> ScoreRepository {
    ScoreRepository::new(init_retry_guard(pool, config), config.use_inventory)
}

/// Builds the aggregate reader sharing `repository`'s table cache.
pub fn init_aggregator(repository: &ScoreRepository) -> ConcurrentAggregator {
    ConcurrentAggregator::new(repository.clone())
}

/// Builds the service status recorder around an external probe.
pub fn init_recorder<P: ServiceProbe>(
    pool: &ConnectionPool,
    config: &Config,
    probe: P,
) -> ServiceStatusRecorder<P> {
    ServiceStatusRecorder::new(init_retry_guard(pool, config), probe)
}

// storage/mod.rs
// Connection pooling, retry policy and table bootstrap

pub mod pool;
pub mod retry;
pub mod schema;
#[cfg(test)]
pub mod test_helpers;

pub use pool::{ConnectionHandle, ConnectionPool, PoolConfig};
pub use retry::{ConnFuture, RetryGuard};
pub use schema::{ensure_schema, TableName};

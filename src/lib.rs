//! scoreboard library: a resilient, pooled data-access layer
//!
//! This library records game scores and OS service status in a SQLite
//! database. Every operation borrows a connection from a fixed-size pool and
//! runs under a single reconnect-and-retry policy; score tables can be read
//! in parallel, and arbitrary SQL can be run inside an explicitly committed
//! or rolled-back session with an audit log.
//!
//! # Example
//!
//! ```no_run
//! use scoreboard::initialization::{init_aggregator, init_pool, init_repository};
//! use scoreboard::{ensure_schema, Config, Game};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     database_url: "sqlite://scores.db".to_string(),
//!     ..Default::default()
//! };
//!
//! let pool = init_pool(&config).await?;
//! ensure_schema(&pool).await?;
//!
//! let repository = init_repository(&pool, &config);
//! repository.add_score(Game::Uno, "Alice", 12).await?;
//!
//! for table in init_aggregator(&repository).read(Game::All).await? {
//!     match table.outcome {
//!         Ok(rows) => println!("{}: {} rows", table.table, rows.len()),
//!         Err(e) => println!("{}: {}", table.table, e),
//!     }
//! }
//! pool.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
mod error_handling;
pub mod initialization;
pub mod scores;
pub mod services;
pub mod session;
pub mod storage;
mod utils;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{AuditError, DatabaseError, InitializationError, ServiceError};
pub use scores::{
    AddOutcome, ConcurrentAggregator, Game, LogAndClearSummary, ScoreRecord, ScoreRepository,
    TableScores,
};
pub use services::{
    ServiceAction, ServiceProbe, ServiceState, ServiceStatus, ServiceStatusRecorder, SystemProbe,
};
pub use session::{AuditLog, Decision, SessionState, StatementOutcome, TransactionSession};
pub use storage::{
    ensure_schema, ConnectionHandle, ConnectionPool, PoolConfig, RetryGuard, TableName,
};

//! Database connection pool management.
//!
//! `ConnectionPool` owns a fixed-size set of SQLite connections:
//! - WAL mode and a busy timeout so pooled connections can share one file
//! - Bounded acquisition: `acquire` fails with `ExhaustedError` after the timeout
//! - Broken handles are discarded on release and lazily replaced
//!
//! Handles return to the pool when they go out of scope, on every exit path.

use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use std::time::Duration;

use log::{debug, error, info, warn};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::config::SQLITE_BUSY_TIMEOUT;
use crate::error_handling::DatabaseError;

/// Construction parameters for [`ConnectionPool`]. Not mutable afterwards.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Database target, e.g. `sqlite://scores.db`
    pub database_url: String,
    /// Fixed number of connections
    pub size: u32,
    /// Upper bound on how long `acquire` blocks
    pub acquire_timeout: Duration,
}

/// A bounded, shareable pool of database connections.
///
/// Cloning is cheap and yields another reference to the same pool.
#[derive(Clone, Debug)]
pub struct ConnectionPool {
    pool: SqlitePool,
    acquire_timeout: Duration,
}

impl ConnectionPool {
    /// Opens a pool against `config.database_url`.
    ///
    /// The database file is created if it doesn't exist. Connections are
    /// opened lazily, so a pool of 5 holds zero live sessions until used.
    pub async fn connect(config: PoolConfig) -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| {
                error!("Invalid database URL {}: {e}", config.database_url);
                DatabaseError::ConnectionError(e)
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(SQLITE_BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.size.max(1))
            .min_connections(0)
            .acquire_timeout(config.acquire_timeout)
            .test_before_acquire(true)
            .connect_with(options)
            .await
            .map_err(|e| {
                error!("Failed to connect to database: {e}");
                DatabaseError::from(e)
            })?;

        info!("Opened database {}", config.database_url);
        Ok(Self {
            pool,
            acquire_timeout: config.acquire_timeout,
        })
    }

    /// Borrows a connection, waiting at most the configured acquisition timeout.
    ///
    /// # Errors
    ///
    /// - `ExhaustedError` when every connection stays lent for the whole timeout
    /// - `ConnectionError` when a replacement connection cannot be opened
    pub async fn acquire(&self) -> Result<ConnectionHandle, DatabaseError> {
        match self.pool.acquire().await {
            Ok(conn) => Ok(ConnectionHandle::new(conn)),
            Err(sqlx::Error::PoolTimedOut) => {
                warn!(
                    "No pooled connection became available within {:?}",
                    self.acquire_timeout
                );
                Err(DatabaseError::ExhaustedError {
                    timeout: self.acquire_timeout,
                })
            }
            Err(e) => Err(DatabaseError::from(e)),
        }
    }

    /// Returns a connection to the idle set.
    ///
    /// Safe to call with a broken handle: the connection is closed and the
    /// pool opens a fresh one on a later `acquire` instead of lending it out.
    pub async fn release(&self, mut handle: ConnectionHandle) {
        if !handle.broken {
            return;
        }
        if let Some(conn) = handle.conn.take() {
            debug!("Discarding broken pooled connection");
            if let Err(e) = conn.close().await {
                debug!("Closing broken connection failed: {e}");
            }
        }
    }

    /// Borrows a connection and begins a transaction on it.
    ///
    /// The connection stays with the transaction until commit or rollback;
    /// dropping the transaction rolls back and returns the connection.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, DatabaseError> {
        match self.pool.begin().await {
            Ok(tx) => Ok(tx),
            Err(sqlx::Error::PoolTimedOut) => Err(DatabaseError::ExhaustedError {
                timeout: self.acquire_timeout,
            }),
            Err(e) => Err(DatabaseError::from(e)),
        }
    }

    /// Closes every connection. Further acquisitions fail.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Connection pool closed");
    }

    /// Number of live connections (lent plus idle).
    pub fn size(&self) -> u32 {
        self.pool.size()
    }

    /// Number of idle connections.
    pub fn num_idle(&self) -> usize {
        self.pool.num_idle()
    }

    /// Underlying sqlx pool, for bootstrap code that runs outside a handle.
    pub(crate) fn inner(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Exclusive loan of one pooled connection.
///
/// Dereferences to the connection. Dropping the handle gives the connection
/// back to the pool; a handle marked broken is detached and closed instead.
pub struct ConnectionHandle {
    conn: Option<PoolConnection<Sqlite>>,
    broken: bool,
}

impl ConnectionHandle {
    fn new(conn: PoolConnection<Sqlite>) -> Self {
        Self {
            conn: Some(conn),
            broken: false,
        }
    }

    /// Flags the connection as unusable so release discards it.
    pub fn mark_broken(&mut self) {
        self.broken = true;
    }

    /// Whether the handle was flagged as broken.
    pub fn is_broken(&self) -> bool {
        self.broken
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("broken", &self.broken)
            .finish_non_exhaustive()
    }
}

impl Deref for ConnectionHandle {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        // `conn` is only taken by `release` or `drop`, both of which consume the handle
        self.conn.as_ref().expect("connection handle already released")
    }
}

impl DerefMut for ConnectionHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect("connection handle already released")
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if self.broken {
                // Detached connections no longer count against the pool size
                drop(conn.detach());
            }
        }
    }
}

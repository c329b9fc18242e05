//! Error type definitions.
//!
//! This module defines the error taxonomy of the data-access layer. The
//! split between `ConnectionError` and `StatementError` is what the retry
//! guard keys on, so every `sqlx::Error` entering the crate goes through
//! [`DatabaseError::from`].

use std::time::Duration;

use log::SetLoggerError;
use thiserror::Error;

/// SQLite primary result codes that indicate the session itself is unusable.
const SQLITE_IOERR: i32 = 10;
const SQLITE_CANTOPEN: i32 = 14;
const SQLITE_NOTADB: i32 = 26;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum DatabaseError {
    /// Transport-level failure: broken pipe, lost session, unreadable file.
    /// Eligible for exactly one reconnect-and-retry cycle.
    #[error("Connection error: {0}")]
    ConnectionError(#[source] sqlx::Error),

    /// SQL syntax, constraint violation, type mismatch. Never retried.
    #[error("Statement error: {0}")]
    StatementError(#[source] sqlx::Error),

    /// No pooled connection became available within the acquisition timeout.
    #[error("Connection pool exhausted: no connection available within {timeout:?}")]
    ExhaustedError {
        /// The acquisition timeout that elapsed
        timeout: Duration,
    },

    /// The requested game is not one of the known games.
    #[error("Unknown game: {0:?}")]
    UnknownGameError(String),

    /// A game or table could not be resolved to a single table.
    #[error("Lookup error: {0}")]
    LookupError(String),

    /// A table identifier failed validation and was not substituted into SQL.
    #[error("Invalid table identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A player name is required to derive the row code.
    #[error("Player name must not be empty")]
    EmptyPlayerName,

    /// A concurrent read task panicked or was cancelled before reporting.
    #[error("Read task failed: {0}")]
    TaskFailed(String),

    /// The ad-hoc session has already been committed or rolled back.
    #[error("Transaction session is already closed")]
    SessionClosed,
}

impl DatabaseError {
    /// Returns true for errors the retry guard is allowed to retry.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, DatabaseError::ConnectionError(_))
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => DatabaseError::ExhaustedError {
                timeout: Duration::ZERO,
            },
            e if is_connection_level(&e) => DatabaseError::ConnectionError(e),
            e => DatabaseError::StatementError(e),
        }
    }
}

/// Decides whether a driver error means the connection is gone rather than
/// the statement being wrong.
fn is_connection_level(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            // Extended result codes carry the primary code in the low byte
            .map(|code| matches!(code & 0xff, SQLITE_IOERR | SQLITE_CANTOPEN | SQLITE_NOTADB))
            .unwrap_or(false),
        _ => false,
    }
}

/// Error types for service probing and service bookkeeping.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Service names are restricted to word characters and dashes.
    #[error("Invalid service name: {0:?}")]
    InvalidServiceName(String),

    /// The probe command could not be spawned.
    #[error("Service probe failed: {0}")]
    ProbeFailed(#[from] std::io::Error),

    /// Persisting the probe result failed.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Error persisting a SQL session audit log.
#[derive(Error, Debug)]
#[error("Failed to write audit log to {path}: {source}")]
pub struct AuditError {
    /// Destination that could not be written
    pub path: String,
    /// Underlying I/O failure
    #[source]
    pub source: std::io::Error,
}

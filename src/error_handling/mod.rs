//! Error handling.
//!
//! This module provides the crate's error types:
//! - `DatabaseError` for everything that touches the pool or a connection
//! - `ServiceError` for service probing and status bookkeeping
//! - `AuditError` for SQL session log persistence
//! - `InitializationError` for logger setup

mod types;

pub use types::{AuditError, DatabaseError, InitializationError, ServiceError};

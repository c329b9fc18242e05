//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (pool size, timeouts, table names)
//! - The library `Config` and the CLI option types

mod constants;
mod types;

pub use constants::*;
pub use types::{Command, Config, LogFormat, LogLevel, Opt};

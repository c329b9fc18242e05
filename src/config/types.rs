//! Configuration types and CLI options.
//!
//! This module defines the library `Config` and the clap-derived `Opt` used
//! by the binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_AUDIT_LOG_PATH, DEFAULT_DATABASE_URL, DEFAULT_LOG_TABLE,
    DEFAULT_POOL_SIZE, DEFAULT_RECONNECT_DELAY,
};
use crate::services::ServiceAction;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// Everything here is fixed once the pool has been built from it.
///
/// # Examples
///
/// ```no_run
/// use scoreboard::Config;
/// use std::time::Duration;
///
/// let config = Config {
///     database_url: "sqlite://scores.db".to_string(),
///     pool_size: 3,
///     acquire_timeout: Duration::from_secs(2),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Database target, e.g. `sqlite://scores.db`
    pub database_url: String,

    /// Fixed number of pooled connections
    pub pool_size: u32,

    /// Upper bound on how long `acquire` blocks
    pub acquire_timeout: Duration,

    /// Pause before the single reconnect-and-retry
    pub reconnect_delay: Duration,

    /// Resolve game tables through the `Inventory` table first
    pub use_inventory: bool,

    /// Table receiving date-stamped snapshots in `log_and_clear`
    pub log_table: String,

    /// Where SQL session audit logs are appended
    pub audit_log_path: PathBuf,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            use_inventory: true,
            log_table: DEFAULT_LOG_TABLE.to_string(),
            audit_log_path: PathBuf::from(DEFAULT_AUDIT_LOG_PATH),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

/// Command-line options for the `scoreboard` binary.
///
/// # Examples
///
/// ```bash
/// scoreboard --database-url sqlite://scores.db add uno Alice 12
/// scoreboard show all
/// echo "SELECT * FROM UNO" | scoreboard sql
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "scoreboard",
    about = "Records game scores and service health checks in a SQLite database."
)]
pub struct Opt {
    /// Database URL
    #[arg(long, env = "SCOREBOARD_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Number of pooled connections
    #[arg(long, default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: u32,

    /// Seconds to wait for a pooled connection
    #[arg(long, default_value_t = DEFAULT_ACQUIRE_TIMEOUT.as_secs())]
    pub acquire_timeout_secs: u64,

    /// Milliseconds to wait before reconnecting after a connection failure
    #[arg(long, default_value_t = DEFAULT_RECONNECT_DELAY.as_millis() as u64)]
    pub reconnect_delay_ms: u64,

    /// Use static table names only (skip the Inventory lookup)
    #[arg(long)]
    pub no_inventory: bool,

    /// Table receiving snapshots in log-and-clear
    #[arg(long, default_value = DEFAULT_LOG_TABLE)]
    pub log_table: String,

    /// File the SQL session audit log is appended to
    #[arg(long, value_parser, default_value = DEFAULT_AUDIT_LOG_PATH)]
    pub audit_log: PathBuf,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations exposed by the binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the score, log, service and inventory tables if missing
    Init,
    /// Print the table a game resolves to
    Resolve {
        /// UNO, Chess, Carrom
        game: String,
    },
    /// Record a score (no-op when the player's code is already present)
    Add {
        game: String,
        player: String,
        score: i64,
    },
    /// Show scores for one game, or for every game with ALL
    Show {
        game: String,
        /// Print rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add a delta to a player's score
    Update {
        game: String,
        player: String,
        #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
        delta: i64,
    },
    /// Zero every score of a game
    Reset { game: String },
    /// Remove every row of a game
    Clear { game: String },
    /// Snapshot today's scores into the log table, then zero them
    LogAndClear { game: String },
    /// Probe a service and record whether it is running
    ServiceCheck { name: String },
    /// List recorded service states
    ServiceStatus,
    /// Start, stop, restart or show a service
    Service {
        name: String,
        #[arg(value_enum)]
        action: ServiceAction,
    },
    /// Ad-hoc transactional SQL session reading statements from stdin
    Sql,
}

impl Opt {
    /// Builds the library configuration from the parsed command line.
    pub fn to_config(&self) -> Config {
        Config {
            database_url: self.database_url.clone(),
            pool_size: self.pool_size,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
            use_inventory: !self.no_inventory,
            log_table: self.log_table.clone(),
            audit_log_path: self.audit_log.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
        }
    }
}

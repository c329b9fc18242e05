//! Configuration constants.
//!
//! Defaults for the pool, the retry guard and the table layout. All of them
//! can be overridden through `Config`.

use std::time::Duration;

/// Default database target (SQLite file next to the working directory)
pub const DEFAULT_DATABASE_URL: &str = "sqlite://scoreboard.db";

/// Number of pooled connections
pub const DEFAULT_POOL_SIZE: u32 = 5;

/// How long `acquire` waits for a free connection before failing with `ExhaustedError`
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause between discarding a broken connection and reacquiring one
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// SQLite busy timeout so concurrent pooled connections wait on the file lock
/// instead of failing immediately
pub const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Number of re-executions after the first attempt. The guard never retries more.
pub const RETRY_MAX_REATTEMPTS: usize = 1;

/// Table holding date-stamped score snapshots
pub const DEFAULT_LOG_TABLE: &str = "Logs";

/// Table holding the latest service health checks
pub const SERVICES_TABLE: &str = "Services";

/// Table mapping game ids to table names
pub const INVENTORY_TABLE: &str = "Inventory";

/// Where SQL session audit logs are appended by default
pub const DEFAULT_AUDIT_LOG_PATH: &str = "sql_session.log";

/// Service names are stored upper-cased and truncated to this many characters
pub const MAX_SERVICE_NAME_LENGTH: usize = 20;

/// Maximum length of the result field of an audit-log line, in characters.
/// Statement text is never truncated.
pub const MAX_AUDIT_FIELD_LENGTH: usize = 1_000_000;

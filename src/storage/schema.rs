//! Table bootstrap and identifier validation.
//!
//! Table names cannot be bound as parameters, so every name that is
//! substituted into statement text goes through [`TableName::parse`] first.

use std::fmt;
use std::sync::LazyLock;

use log::info;
use regex::Regex;

use crate::config::{DEFAULT_LOG_TABLE, INVENTORY_TABLE, SERVICES_TABLE};
use crate::error_handling::DatabaseError;
use crate::scores::Game;
use crate::storage::pool::ConnectionPool;

static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,63}$").expect("identifier pattern is valid")
});

/// A validated SQL table identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Accepts `name` only if it is a plain identifier.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier` for anything containing quotes, spaces,
    /// punctuation, or longer than 64 characters.
    pub fn parse(name: &str) -> Result<Self, DatabaseError> {
        if IDENTIFIER_PATTERN.is_match(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(DatabaseError::InvalidIdentifier(name.to_string()))
        }
    }

    /// The bare identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier quoted for substitution into statement text.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creates the score, log, service and inventory tables if they are missing.
///
/// Idempotent; existing tables and rows are left untouched.
pub async fn ensure_schema(pool: &ConnectionPool) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;

    for game in Game::playable() {
        let table = TableName::parse(game.static_table())?;
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                Name TEXT NOT NULL,
                Score INTEGER NOT NULL DEFAULT 0,
                Code TEXT NOT NULL UNIQUE
            )",
            table.quoted()
        ))
        .execute(&mut *tx)
        .await?;
    }

    ensure_log_table(&mut *tx, &TableName::parse(DEFAULT_LOG_TABLE)?).await?;

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {} (
            Name TEXT NOT NULL,
            Status TEXT NOT NULL,
            Restart TEXT NOT NULL
        )",
        TableName::parse(SERVICES_TABLE)?.quoted()
    ))
    .execute(&mut *tx)
    .await?;

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {} (
            ID INTEGER PRIMARY KEY,
            Name TEXT NOT NULL
        )",
        TableName::parse(INVENTORY_TABLE)?.quoted()
    ))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!("Schema ready");
    Ok(())
}

/// Creates a log table with the `Name, Score, Logdate` layout.
async fn ensure_log_table(
    conn: &mut sqlx::SqliteConnection,
    table: &TableName,
) -> Result<(), DatabaseError> {
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {} (
            Name TEXT NOT NULL,
            Score INTEGER NOT NULL,
            Logdate TEXT NOT NULL
        )",
        table.quoted()
    ))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

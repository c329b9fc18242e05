//! Score table operations.
//!
//! Every method resolves the game's table, then runs its statements through
//! the retry guard on a single pooled connection. Multi-statement methods
//! wrap their statements in one transaction on that connection.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::{debug, info};
use sqlx::Connection;

use crate::config::INVENTORY_TABLE;
use crate::error_handling::DatabaseError;
use crate::scores::game::{player_code, Game};
use crate::scores::models::{AddOutcome, LogAndClearSummary, ScoreRecord};
use crate::storage::{RetryGuard, TableName};

/// CRUD-style access to the per-game score tables.
///
/// Cloning is cheap; clones share the pool and the resolved-table cache.
#[derive(Clone, Debug)]
pub struct ScoreRepository {
    guard: RetryGuard,
    use_inventory: bool,
    tables: Arc<RwLock<HashMap<Game, TableName>>>,
}

impl ScoreRepository {
    /// Creates a repository. With `use_inventory`, table names are looked up
    /// in the `Inventory` table before falling back to the static names.
    pub fn new(guard: RetryGuard, use_inventory: bool) -> Self {
        Self {
            guard,
            use_inventory,
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn cached_table(&self, game: Game) -> Option<TableName> {
        self.tables
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&game)
            .cloned()
    }

    /// Resolves the table holding `game`'s scores.
    ///
    /// Prefers the inventory row for the game, falls back to the static name
    /// when there is none. The first successful resolution is cached for the
    /// lifetime of the repository, so repeated calls return the same table.
    ///
    /// # Errors
    ///
    /// - `LookupError` for `Game::All`, which has no single table
    /// - `InvalidIdentifier` if the inventory names a table that is not a
    ///   plain identifier
    pub async fn resolve_table(&self, game: Game) -> Result<TableName, DatabaseError> {
        if game.is_aggregate() {
            return Err(DatabaseError::LookupError(format!(
                "{game} is an aggregate of every game and has no single table"
            )));
        }
        if let Some(table) = self.cached_table(game) {
            return Ok(table);
        }

        let dynamic = match (self.use_inventory, game.inventory_id()) {
            (true, Some(id)) => self.lookup_inventory(id).await?,
            _ => None,
        };
        let table = match dynamic {
            Some(name) => TableName::parse(name.trim())?,
            None => {
                debug!("No inventory row for {game}, using static table name");
                TableName::parse(game.static_table())?
            }
        };

        let mut tables = self
            .tables
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // A concurrent resolver may have won the race; keep its answer
        Ok(tables.entry(game).or_insert(table).clone())
    }

    async fn lookup_inventory(&self, id: i64) -> Result<Option<String>, DatabaseError> {
        let inventory = TableName::parse(INVENTORY_TABLE)?;
        self.guard
            .run("inventory lookup", |conn| {
                let sql = format!("SELECT Name FROM {} WHERE ID = ?", inventory.quoted());
                Box::pin(async move {
                    let name: Option<String> = sqlx::query_scalar(&sql)
                        .bind(id)
                        .fetch_optional(&mut *conn)
                        .await?;
                    Ok(name)
                })
            })
            .await
    }

    /// Resolves the tables of every playable game, in display order.
    pub async fn resolve_all(&self) -> Result<Vec<TableName>, DatabaseError> {
        let mut tables = Vec::new();
        for game in Game::playable() {
            tables.push(self.resolve_table(game).await?);
        }
        Ok(tables)
    }

    /// Records `score` for `player` unless a row with the player's code exists.
    ///
    /// An existing code is idempotent success (`AlreadyRecorded`), not an
    /// error; the stored score stays the one from the first call. The
    /// existence check and the insert are one statement, so SQLite takes the
    /// write lock up front and concurrent callers wait on the busy timeout
    /// instead of failing.
    pub async fn add_score(
        &self,
        game: Game,
        player: &str,
        score: i64,
    ) -> Result<AddOutcome, DatabaseError> {
        let table = self.resolve_table(game).await?;
        let code = player_code(player)?;
        let player = player.trim().to_string();

        let outcome = self
            .guard
            .run("add score", |conn| {
                let sql = format!(
                    "INSERT INTO {0} (Name, Score, Code) SELECT ?, ?, ? \
                     WHERE NOT EXISTS (SELECT 1 FROM {0} WHERE Code = ?)",
                    table.quoted()
                );
                let (player, code) = (player.clone(), code.clone());
                Box::pin(async move {
                    let inserted = sqlx::query(&sql)
                        .bind(&player)
                        .bind(score)
                        .bind(&code)
                        .bind(&code)
                        .execute(&mut *conn)
                        .await?
                        .rows_affected();
                    Ok(if inserted == 0 {
                        AddOutcome::AlreadyRecorded
                    } else {
                        AddOutcome::Inserted
                    })
                })
            })
            .await?;

        match outcome {
            AddOutcome::Inserted => {
                info!("Inserted {player} ({code}) with score {score} into {table}")
            }
            AddOutcome::AlreadyRecorded => info!("Record exists for code {code} in {table}"),
        }
        Ok(outcome)
    }

    /// Reads every row of `game`'s table.
    pub async fn show_scores(&self, game: Game) -> Result<Vec<ScoreRecord>, DatabaseError> {
        let table = self.resolve_table(game).await?;
        self.read_table(&table).await
    }

    /// Full scan of an already-resolved table, in insertion order.
    pub async fn read_table(&self, table: &TableName) -> Result<Vec<ScoreRecord>, DatabaseError> {
        self.guard
            .run("read scores", |conn| {
                let sql = format!(
                    "SELECT Name, Score, Code FROM {} ORDER BY rowid",
                    table.quoted()
                );
                Box::pin(async move {
                    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
                    let records = rows
                        .iter()
                        .map(ScoreRecord::from_row)
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(records)
                })
            })
            .await
    }

    /// Adds `delta` to the score of the row matching `player`'s code.
    ///
    /// Returns the number of rows affected; 0 means no such player and is
    /// not an error.
    pub async fn update_score(
        &self,
        game: Game,
        player: &str,
        delta: i64,
    ) -> Result<u64, DatabaseError> {
        let table = self.resolve_table(game).await?;
        let code = player_code(player)?;

        let affected = self
            .guard
            .run("update score", |conn| {
                let sql = format!(
                    "UPDATE {} SET Score = Score + ? WHERE Code = ?",
                    table.quoted()
                );
                let code = code.clone();
                Box::pin(async move {
                    let result = sqlx::query(&sql)
                        .bind(delta)
                        .bind(&code)
                        .execute(&mut *conn)
                        .await?;
                    Ok(result.rows_affected())
                })
            })
            .await?;

        info!("Updated {table} code {code} by {delta} ({affected} rows)");
        Ok(affected)
    }

    /// Sets every score of `game` to 0. Returns the number of rows touched.
    pub async fn reset_scores(&self, game: Game) -> Result<u64, DatabaseError> {
        let table = self.resolve_table(game).await?;
        let affected = self
            .guard
            .run("reset scores", |conn| {
                let sql = format!("UPDATE {} SET Score = 0", table.quoted());
                Box::pin(async move {
                    Ok(sqlx::query(&sql)
                        .execute(&mut *conn)
                        .await?
                        .rows_affected())
                })
            })
            .await?;
        info!("Reset scores in {table}");
        Ok(affected)
    }

    /// Removes every row of `game`'s table.
    ///
    /// Uses a row-deleting statement inside a transaction, so the clear is
    /// all-or-nothing and can be rolled back.
    pub async fn clear_table(&self, game: Game) -> Result<(), DatabaseError> {
        let table = self.resolve_table(game).await?;
        self.guard
            .run("clear table", |conn| {
                let sql = format!("DELETE FROM {}", table.quoted());
                Box::pin(async move {
                    let mut tx = conn.begin().await?;
                    sqlx::query(&sql).execute(&mut *tx).await?;
                    tx.commit().await?;
                    Ok(())
                })
            })
            .await?;
        info!("Cleared table {table}");
        Ok(())
    }

    /// Snapshots `game`'s scores into `log_table` stamped with today's date,
    /// then zeroes them.
    ///
    /// The three statements (drop today's log rows, copy, zero) run in one
    /// transaction on one connection: either all of them take effect or none
    /// does. Running it twice on the same day replaces that day's snapshot.
    pub async fn log_and_clear(
        &self,
        game: Game,
        log_table: &str,
    ) -> Result<LogAndClearSummary, DatabaseError> {
        let table = self.resolve_table(game).await?;
        let log_table = TableName::parse(log_table)?;
        // Fixed once so a retry stamps the same date as the first attempt
        let log_date = chrono::Local::now().date_naive();
        let stamp = log_date.format("%Y-%m-%d").to_string();

        let summary = self
            .guard
            .run("log and clear", |conn| {
                let delete_sql = format!("DELETE FROM {} WHERE Logdate = ?", log_table.quoted());
                let copy_sql = format!(
                    "INSERT INTO {} (Name, Score, Logdate) SELECT Name, Score, ? FROM {}",
                    log_table.quoted(),
                    table.quoted()
                );
                let zero_sql = format!("UPDATE {} SET Score = 0", table.quoted());
                let stamp = stamp.clone();
                Box::pin(async move {
                    let mut tx = conn.begin().await?;
                    let replaced = sqlx::query(&delete_sql)
                        .bind(&stamp)
                        .execute(&mut *tx)
                        .await?
                        .rows_affected();
                    let logged = sqlx::query(&copy_sql)
                        .bind(&stamp)
                        .execute(&mut *tx)
                        .await?
                        .rows_affected();
                    let zeroed = sqlx::query(&zero_sql)
                        .execute(&mut *tx)
                        .await?
                        .rows_affected();
                    tx.commit().await?;
                    Ok(LogAndClearSummary {
                        log_date,
                        replaced,
                        logged,
                        zeroed,
                    })
                })
            })
            .await?;

        info!(
            "Logged and cleared {table} into {log_table} ({} rows, {} same-day rows replaced)",
            summary.logged, summary.replaced
        );
        Ok(summary)
    }
}

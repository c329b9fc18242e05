//! Concurrent fan-out reads across game tables.
//!
//! One task is spawned per table; each borrows its own pooled connection.
//! Results come back in the order the tables were given, whatever order the
//! tasks finish in, and a failing table never takes its siblings down.

use futures::future::join_all;
use log::{info, warn};

use crate::error_handling::DatabaseError;
use crate::scores::game::Game;
use crate::scores::models::TableScores;
use crate::scores::repository::ScoreRepository;
use crate::storage::TableName;

/// Reads several score tables in parallel.
#[derive(Clone, Debug)]
pub struct ConcurrentAggregator {
    repository: ScoreRepository,
}

impl ConcurrentAggregator {
    pub fn new(repository: ScoreRepository) -> Self {
        Self { repository }
    }

    /// Reads `game`'s scores. `Game::All` fans out across every playable
    /// game; any other game yields a single entry.
    ///
    /// # Errors
    ///
    /// Only table resolution errors are returned here. Per-table read
    /// failures are reported inside the matching [`TableScores`].
    pub async fn read(&self, game: Game) -> Result<Vec<TableScores>, DatabaseError> {
        let tables = if game.is_aggregate() {
            self.repository.resolve_all().await?
        } else {
            vec![self.repository.resolve_table(game).await?]
        };
        Ok(self.read_tables(tables).await)
    }

    /// Reads every table in `tables` concurrently and returns one entry per
    /// table, in the same order.
    pub async fn read_tables(&self, tables: Vec<TableName>) -> Vec<TableScores> {
        let handles: Vec<_> = tables
            .iter()
            .cloned()
            .map(|table| {
                let repository = self.repository.clone();
                tokio::spawn(async move { repository.read_table(&table).await })
            })
            .collect();

        let joined = join_all(handles).await;

        let results: Vec<TableScores> = tables
            .into_iter()
            .zip(joined)
            .map(|(table, joined)| {
                let outcome = match joined {
                    Ok(outcome) => outcome,
                    Err(join_error) => Err(DatabaseError::TaskFailed(format!(
                        "{table}: {join_error}"
                    ))),
                };
                if let Err(ref e) = outcome {
                    warn!("Reading {table} failed: {e}");
                }
                TableScores { table, outcome }
            })
            .collect();

        let failed = results.iter().filter(|r| !r.is_ok()).count();
        info!(
            "Read {} tables concurrently ({} failed)",
            results.len(),
            failed
        );
        results
    }
}

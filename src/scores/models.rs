//! Score data types.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error_handling::DatabaseError;
use crate::storage::TableName;

/// One row of a game's score table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRecord {
    pub player: String,
    pub score: i64,
    pub code: String,
}

impl ScoreRecord {
    /// Reads a `Name, Score, Code` row.
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            player: row.try_get("Name")?,
            score: row.try_get("Score")?,
            code: row.try_get("Code")?,
        })
    }
}

/// Result of `add_score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    /// A row with the same code already existed; nothing was written.
    AlreadyRecorded,
}

/// What `log_and_clear` did, counted per statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogAndClearSummary {
    pub log_date: NaiveDate,
    /// Same-day log rows removed before the snapshot
    pub replaced: u64,
    /// Score rows copied into the log table
    pub logged: u64,
    /// Score rows zeroed
    pub zeroed: u64,
}

/// One table's share of an aggregate read.
///
/// An empty `Ok` vector means the table exists and has no rows; a missing
/// or unreadable table shows up as an `Err` attributed to that table.
#[derive(Debug)]
pub struct TableScores {
    pub table: TableName,
    pub outcome: Result<Vec<ScoreRecord>, DatabaseError>,
}

impl TableScores {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

//! Executing one ad-hoc statement and describing what it did.

use futures::TryStreamExt;
use serde_json::json;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Either, Executor, Row, SqliteConnection, ValueRef};

use crate::error_handling::DatabaseError;

/// Keywords whose statements produce a row set even when no rows match.
const ROW_SET_KEYWORDS: [&str; 5] = ["SELECT", "WITH", "PRAGMA", "EXPLAIN", "VALUES"];

/// What a single statement in a session produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    /// A row set, with every cell already rendered as text.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Number of rows changed by a DML or DDL statement.
    Affected(u64),
    /// The statement failed; the message is kept verbatim.
    Failed(String),
}

impl StatementOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, StatementOutcome::Failed(_))
    }

    /// One-line result text for the audit log.
    ///
    /// Row sets keep their data: the row count followed by a JSON object with
    /// the column names and every rendered row.
    pub fn summary(&self) -> String {
        match self {
            StatementOutcome::Rows { columns, rows } => {
                let data = json!({ "columns": columns, "rows": rows });
                format!("{} rows {data}", rows.len())
            }
            StatementOutcome::Affected(n) => format!("{n} rows affected"),
            StatementOutcome::Failed(message) => message.clone(),
        }
    }
}

/// Trims `input` and enforces a trailing `;`. Returns `None` for blank input.
pub fn normalize_statement(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == ';') {
        return None;
    }
    if trimmed.ends_with(';') {
        Some(trimmed.to_string())
    } else {
        Some(format!("{trimmed};"))
    }
}

fn returns_row_set(statement: &str) -> bool {
    let keyword: String = statement
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    ROW_SET_KEYWORDS
        .iter()
        .any(|k| k.eq_ignore_ascii_case(&keyword))
}

/// Runs `statement` on `conn` and captures its row set or affected count.
///
/// Errors are returned, not folded into [`StatementOutcome::Failed`]; the
/// session decides how to record them.
pub(crate) async fn execute_statement(
    conn: &mut SqliteConnection,
    statement: &str,
) -> Result<StatementOutcome, DatabaseError> {
    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut affected: u64 = 0;

    {
        let mut stream = (&mut *conn).fetch_many(statement);
        while let Some(item) = stream.try_next().await? {
            match item {
                Either::Left(result) => affected += result.rows_affected(),
                Either::Right(row) => {
                    if columns.is_empty() {
                        columns = column_names(&row);
                    }
                    rows.push(render_row(&row)?);
                }
            }
        }
    }

    if rows.is_empty() && !returns_row_set(statement) {
        return Ok(StatementOutcome::Affected(affected));
    }

    if columns.is_empty() {
        // No row to read names from; ask the driver for the result shape.
        columns = match (&mut *conn).describe(statement).await {
            Ok(described) => described
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            Err(_) => Vec::new(),
        };
    }

    Ok(StatementOutcome::Rows { columns, rows })
}

fn column_names(row: &SqliteRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

fn render_row(row: &SqliteRow) -> Result<Vec<String>, sqlx::Error> {
    (0..row.len()).map(|i| render_cell(row, i)).collect()
}

fn render_cell(row: &SqliteRow, index: usize) -> Result<String, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok("NULL".to_string());
    }
    if let Ok(v) = row.try_get::<i64, _>(index) {
        return Ok(v.to_string());
    }
    if let Ok(v) = row.try_get::<f64, _>(index) {
        return Ok(v.to_string());
    }
    if let Ok(v) = row.try_get::<String, _>(index) {
        return Ok(v);
    }
    let bytes: Vec<u8> = row.try_get(index)?;
    Ok(format!("<{} bytes>", bytes.len()))
}

/// Renders a row set as a boxed text table.
pub fn render_table(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let border = {
        let mut line = String::from("+");
        for w in &widths {
            line.push_str(&"-".repeat(w + 2));
            line.push('+');
        }
        line
    };

    let format_line = |cells: &[String]| {
        let mut line = String::from("|");
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = w - cell.chars().count();
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(pad + 1));
            line.push('|');
        }
        line
    };

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(border.clone());
    out.push(format_line(columns));
    out.push(border.clone());
    for row in rows {
        out.push(format_line(row));
    }
    if !rows.is_empty() {
        out.push(border);
    }
    out.join("\n")
}

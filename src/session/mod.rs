//! Ad-hoc transactional SQL session.
//!
//! A session holds one pooled connection inside an explicit transaction
//! from `open` until `finish`. Every submitted statement runs on that
//! connection and is recorded in the session's [`AuditLog`], failures
//! included; a failing statement never ends the session by itself. The
//! caller decides at the end whether the whole batch commits or rolls back.
//!
//! Sessions are never retried: replaying a half-applied batch on a fresh
//! connection would not be the same unit of work.

mod audit;
mod outcome;

use log::{info, warn};
use sqlx::{Sqlite, Transaction};

use crate::error_handling::DatabaseError;
use crate::storage::ConnectionPool;

pub use audit::{AuditEntry, AuditLog};
pub use outcome::{normalize_statement, render_table, StatementOutcome};

/// Lifecycle of a [`TransactionSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Committed,
    RolledBack,
    /// Commit or rollback itself failed; the connection was discarded.
    Aborted,
}

/// The caller's end-of-session choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Commit,
    Rollback,
}

/// Returns true for the inputs that end statement entry.
pub fn is_exit_command(input: &str) -> bool {
    let trimmed = input.trim().trim_end_matches(';').trim();
    trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit")
}

/// What happened to one line handed to [`TransactionSession::submit`].
#[derive(Debug)]
pub enum Submitted<'a> {
    /// The line was an exit command; nothing ran.
    Exit,
    /// The line was blank; nothing ran or was recorded.
    Blank,
    /// The statement ran (or failed) and was recorded.
    Executed(&'a AuditEntry),
}

/// One explicitly bounded unit of ad-hoc work.
pub struct TransactionSession {
    tx: Option<Transaction<'static, Sqlite>>,
    audit: AuditLog,
    state: SessionState,
}

impl std::fmt::Debug for TransactionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSession")
            .field("state", &self.state)
            .field("statements", &self.audit.len())
            .finish()
    }
}

impl TransactionSession {
    /// Borrows a connection from `pool` and begins a transaction on it.
    ///
    /// # Errors
    ///
    /// Returns `ExhaustedError` if no connection frees up within the pool's
    /// acquisition timeout.
    pub async fn open(pool: &ConnectionPool) -> Result<Self, DatabaseError> {
        let tx = pool.begin().await?;
        info!("SQL session started");
        Ok(Self {
            tx: Some(tx),
            audit: AuditLog::new(),
            state: SessionState::Open,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Executes one statement on the session's connection.
    ///
    /// Returns `Ok(None)` for blank input. Statement failures are recorded
    /// as [`StatementOutcome::Failed`] and returned as `Ok`.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` after [`finish`](Self::finish).
    pub async fn execute(&mut self, input: &str) -> Result<Option<&AuditEntry>, DatabaseError> {
        let tx = self.tx.as_mut().ok_or(DatabaseError::SessionClosed)?;
        let Some(statement) = normalize_statement(input) else {
            return Ok(None);
        };

        let outcome = match outcome::execute_statement(&mut **tx, &statement).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Session statement failed: {e}");
                StatementOutcome::Failed(e.to_string())
            }
        };

        self.audit.push(AuditEntry { statement, outcome });
        Ok(self.audit.entries().last())
    }

    /// Handles one line of interactive input: exit commands end entry,
    /// anything else goes to [`execute`](Self::execute).
    pub async fn submit(&mut self, line: &str) -> Result<Submitted<'_>, DatabaseError> {
        if self.tx.is_none() {
            return Err(DatabaseError::SessionClosed);
        }
        if is_exit_command(line) {
            return Ok(Submitted::Exit);
        }
        Ok(match self.execute(line).await? {
            Some(entry) => Submitted::Executed(entry),
            None => Submitted::Blank,
        })
    }

    /// Feeds `lines` to [`submit`](Self::submit) until an exit command or
    /// the end of input, and returns how many statements ran.
    pub async fn run_until_exit<I, S>(&mut self, lines: I) -> Result<usize, DatabaseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut executed = 0;
        for line in lines {
            match self.submit(line.as_ref()).await? {
                Submitted::Exit => break,
                Submitted::Blank => {}
                Submitted::Executed(_) => executed += 1,
            }
        }
        Ok(executed)
    }

    /// Commits or rolls back every statement of the session as one unit.
    ///
    /// The connection goes back to the pool whatever the outcome. A failed
    /// commit or rollback leaves the session `Aborted` and returns the error.
    pub async fn finish(&mut self, decision: Decision) -> Result<SessionState, DatabaseError> {
        let tx = self.tx.take().ok_or(DatabaseError::SessionClosed)?;
        let result = match decision {
            Decision::Commit => tx.commit().await,
            Decision::Rollback => tx.rollback().await,
        };

        match result {
            Ok(()) => {
                self.state = match decision {
                    Decision::Commit => SessionState::Committed,
                    Decision::Rollback => SessionState::RolledBack,
                };
                info!(
                    "SQL session {:?} after {} statements ({} failed)",
                    self.state,
                    self.audit.len(),
                    self.audit.error_count()
                );
                Ok(self.state)
            }
            Err(e) => {
                self.state = SessionState::Aborted;
                warn!("SQL session {decision:?} failed: {e}");
                Err(e.into())
            }
        }
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    pub fn into_audit_log(self) -> AuditLog {
        self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::{count_rows, create_test_pool};
    use std::time::Duration;

    #[test]
    fn test_exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("  QUIT; "));
        assert!(!is_exit_command("exit_table"));
        assert!(!is_exit_command("SELECT 'exit';"));
    }

    #[tokio::test]
    async fn test_rollback_discards_everything_but_log_keeps_all() {
        let (_dir, pool) = create_test_pool(2, Duration::from_millis(500)).await;
        let mut session = TransactionSession::open(&pool).await.unwrap();

        let executed = session
            .run_until_exit([
                "INSERT INTO UNO (Name, Score, Code) VALUES ('Ann', 3, 'A')",
                "SELECT Name, Score FROM UNO",
                "bad syntax",
                "exit",
                "DELETE FROM UNO",
            ])
            .await
            .unwrap();
        assert_eq!(executed, 3);

        assert_eq!(session.state(), SessionState::Open);
        let state = session.finish(Decision::Rollback).await.unwrap();
        assert_eq!(state, SessionState::RolledBack);
        assert_eq!(session.state(), SessionState::RolledBack);
        assert_eq!(count_rows(&pool, "UNO").await, 0);

        let log = session.audit_log();
        assert_eq!(log.len(), 3);
        assert_eq!(log.entries()[0].outcome, StatementOutcome::Affected(1));
        assert_eq!(
            log.entries()[1].result_text(),
            r#"1 rows {"columns":["Name","Score"],"rows":[["Ann","3"]]}"#
        );
        assert_eq!(log.entries()[2].status(), "ERR");
        assert!(log.entries()[2].result_text().contains("syntax error"));
    }

    #[tokio::test]
    async fn test_commit_persists_and_releases_connection() {
        let (_dir, pool) = create_test_pool(1, Duration::from_millis(300)).await;
        let mut session = TransactionSession::open(&pool).await.unwrap();

        session
            .execute("INSERT INTO Chess (Name, Score, Code) VALUES ('Kim', 1, 'K');")
            .await
            .unwrap();
        session.finish(Decision::Commit).await.unwrap();

        // The single pooled connection must be free again.
        assert_eq!(count_rows(&pool, "Chess").await, 1);
    }

    #[tokio::test]
    async fn test_closed_session_rejects_statements() {
        let (_dir, pool) = create_test_pool(1, Duration::from_millis(300)).await;
        let mut session = TransactionSession::open(&pool).await.unwrap();
        session.finish(Decision::Rollback).await.unwrap();

        assert!(matches!(
            session.execute("SELECT 1").await,
            Err(DatabaseError::SessionClosed)
        ));
        assert!(matches!(
            session.finish(Decision::Commit).await,
            Err(DatabaseError::SessionClosed)
        ));
    }

    #[tokio::test]
    async fn test_submit_line_by_line_stops_at_exit() {
        let (_dir, pool) = create_test_pool(1, Duration::from_millis(300)).await;
        let mut session = TransactionSession::open(&pool).await.unwrap();

        match session.submit("SELECT 1").await.unwrap() {
            Submitted::Executed(entry) => assert_eq!(entry.status(), "OK"),
            other => panic!("expected execution, got {other:?}"),
        }
        assert!(matches!(session.submit("  ").await.unwrap(), Submitted::Blank));
        assert!(matches!(session.submit("Exit;").await.unwrap(), Submitted::Exit));
        assert_eq!(session.audit_log().len(), 1);

        session.finish(Decision::Rollback).await.unwrap();
        assert!(matches!(
            session.submit("exit").await,
            Err(DatabaseError::SessionClosed)
        ));
    }

    #[tokio::test]
    async fn test_blank_input_is_not_recorded() {
        let (_dir, pool) = create_test_pool(1, Duration::from_millis(300)).await;
        let mut session = TransactionSession::open(&pool).await.unwrap();
        assert!(session.execute("   ").await.unwrap().is_none());
        assert!(session.audit_log().is_empty());
    }
}

//! Audit log of an ad-hoc SQL session.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error_handling::AuditError;
use crate::session::outcome::StatementOutcome;
use crate::utils::{flatten_field, sanitize_audit_field};

/// One executed statement and what came of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub statement: String,
    pub outcome: StatementOutcome,
}

impl AuditEntry {
    pub fn status(&self) -> &'static str {
        if self.outcome.is_failure() {
            "ERR"
        } else {
            "OK"
        }
    }

    /// Result column of the log line: a row or affected-row count, or the
    /// error message.
    pub fn result_text(&self) -> String {
        self.outcome.summary()
    }
}

/// Ordered record of every statement submitted in one session.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of statements that failed.
    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failure()).count()
    }

    /// Writes one `STATUS\tSTATEMENT\tRESULT` line per entry.
    ///
    /// Statements are written whole; only oversized result text is truncated.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for entry in &self.entries {
            writeln!(
                writer,
                "{}\t{}\t{}",
                entry.status(),
                flatten_field(&entry.statement),
                sanitize_audit_field(&entry.result_text())
            )?;
        }
        writer.flush()
    }

    /// Appends the log to `path`, creating the file if needed.
    pub fn append_to_file(&self, path: &Path) -> Result<(), AuditError> {
        let to_audit_error = |source| AuditError {
            path: path.display().to_string(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(to_audit_error)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer).map_err(to_audit_error)?;
        info!(
            "Saved {} session log entries to {}",
            self.entries.len(),
            path.display()
        );
        Ok(())
    }
}

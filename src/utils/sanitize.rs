//! Utilities for sanitizing text written to line-oriented sinks.
//!
//! Audit-log records are one line each with tab-separated fields, so
//! statement and result text must not carry tabs, newlines or other
//! control characters of their own.

use crate::config::MAX_AUDIT_FIELD_LENGTH;

/// Flattens `text` into a single tab-free line.
///
/// Tabs, newlines and carriage returns become single spaces; other control
/// characters (0x00-0x1F, 0x7F) are removed. Non-ASCII text is preserved.
pub fn flatten_field(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\t' | '\n' | '\r' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Flattens `text` and truncates it to `MAX_AUDIT_FIELD_LENGTH` characters.
///
/// Used for result text; statements go through [`flatten_field`] alone.
///
/// Truncated fields end with a note about the original length.
pub fn sanitize_audit_field(text: &str) -> String {
    let flattened = flatten_field(text);
    let length = flattened.chars().count();

    if length > MAX_AUDIT_FIELD_LENGTH {
        // Leave room for the truncation note
        let keep = MAX_AUDIT_FIELD_LENGTH.saturating_sub(50);
        let kept: String = flattened.chars().take(keep).collect();
        format!("{kept}... (truncated, original length: {length} chars)")
    } else {
        flattened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_replaces_tabs_and_newlines() {
        let input = "SELECT *\n\tFROM UNO\r\n";
        assert_eq!(flatten_field(input), "SELECT *  FROM UNO  ");
    }

    #[test]
    fn test_flatten_removes_other_control_chars() {
        let input = "Error\x00message\x01with\x7fcontrol";
        assert_eq!(flatten_field(input), "Errormessagewithcontrol");
    }

    #[test]
    fn test_flatten_preserves_unicode() {
        let input = "INSERT INTO UNO VALUES ('测试', 1, '测')";
        assert_eq!(flatten_field(input), input);
    }

    #[test]
    fn test_sanitize_short_field_unchanged() {
        assert_eq!(sanitize_audit_field("3 rows affected"), "3 rows affected");
    }

    #[test]
    fn test_sanitize_truncates_long_field() {
        let input = "é".repeat(MAX_AUDIT_FIELD_LENGTH + 10);
        let output = sanitize_audit_field(&input);
        assert!(output.chars().count() < MAX_AUDIT_FIELD_LENGTH);
        assert!(output.ends_with(&format!(
            "(truncated, original length: {} chars)",
            MAX_AUDIT_FIELD_LENGTH + 10
        )));
    }
}

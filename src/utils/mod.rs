//! Small helpers shared across modules.

pub mod sanitize;

pub use sanitize::{flatten_field, sanitize_audit_field};

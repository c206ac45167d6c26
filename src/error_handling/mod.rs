//! Error handling.
//!
//! This module provides the error types shared by the library:
//! - [`SpfError`] for record parsing, flattening, splitting and reporting
//! - [`InitializationError`] for logger and resolver setup
//!
//! Core operations return `Result<_, SpfError>` and propagate with `?`; only the
//! run orchestration layer converts them into `anyhow` errors with context.

mod types;

// Re-export public API
pub use types::{InitializationError, LookupKind, SpfError};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_lookup_kind_display() {
        let rendered: Vec<String> = LookupKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, vec!["TXT", "MX", "A"]);
    }

    #[test]
    fn test_resolution_error_message() {
        let err = SpfError::resolution(LookupKind::Txt, "_spf.example.com", "timed out");
        assert_eq!(
            err.to_string(),
            "TXT lookup failed for _spf.example.com: timed out"
        );
    }

    #[test]
    fn test_cycle_error_message_shows_path() {
        let err = SpfError::CycleDetected {
            domain: "a.example".to_string(),
            path: vec!["a.example".to_string(), "b.example".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "include cycle detected at a.example: a.example -> b.example"
        );
    }

    #[test]
    fn test_not_an_spf_record_message() {
        let err = SpfError::NotAnSpfRecord("spf1 -all".to_string());
        assert_eq!(err.to_string(), "not a valid SPF record: spf1 -all");
    }
}

//! Error Types
//!
//! Every fallible operation in the crate returns [`ProcessError`]. Parse and
//! validation failures carry the complete list of findings so callers can
//! show all of them at once.

use std::fmt::Display;
use std::io;

use thiserror::Error;

use crate::process::connections::ConnectionError;
use crate::process::validator::Violation;

/// Crate-level error type.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// One or more connection tokens could not be turned into edges.
    #[error("Malformed connection spec:\n{}", join_lines(.0))]
    MalformedConnectionSpec(Vec<ConnectionError>),

    /// The assembled graph failed structural validation.
    #[error("Process failed validation ({} violation(s)):\n{}", .0.len(), join_lines(.0))]
    Invalid(Vec<Violation>),

    /// A serialized record is missing required fields or holds bad values.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Configuration values that would break layout guarantees.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// An invariant that validation should have guaranteed was broken.
    #[error("Internal consistency fault: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ProcessError {
    /// Returns the validator findings, if this is a validation failure.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid(violations) => violations,
            _ => &[],
        }
    }

    /// Returns the rejected connection tokens, if this is a parse failure.
    pub fn connection_errors(&self) -> &[ConnectionError] {
        match self {
            Self::MalformedConnectionSpec(errors) => errors,
            _ => &[],
        }
    }
}

fn join_lines<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("  - {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::model::StepKind;

    #[test]
    fn test_invalid_lists_every_violation() {
        let err = ProcessError::Invalid(vec![
            Violation::MissingTerminal(StepKind::End),
            Violation::DuplicateStepId("S1".to_string()),
        ]);

        let message = err.to_string();
        assert!(message.contains("2 violation(s)"));
        assert!(message.contains("end"));
        assert!(message.contains("'S1'"));
        assert_eq!(err.violations().len(), 2);
        assert!(err.connection_errors().is_empty());
    }

    #[test]
    fn test_connection_errors_accessor() {
        let err = ProcessError::MalformedConnectionSpec(vec![ConnectionError::UnknownStep {
            token: "S1->S9".to_string(),
            id: "S9".to_string(),
        }]);

        assert_eq!(err.connection_errors().len(), 1);
        assert!(err.to_string().contains("S9"));
        assert!(err.violations().is_empty());
    }

    #[test]
    fn test_io_error_conversion() {
        let err: ProcessError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().starts_with("I/O error"));
    }
}

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::resume::{CollectionKind, EntryKey};

/// The backend operation a request failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Load,
    Export,
    ScoreCheck,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Load => "load",
            Operation::Export => "export",
            Operation::ScoreCheck => "score check",
        };
        f.write_str(name)
    }
}

/// Editor-level error type.
/// Every variant converts into a user-facing `Notice` via [`EditorError::notice`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("{kind} index {index} is out of range (length {len})")]
    OutOfRange {
        kind: CollectionKind,
        index: usize,
        len: usize,
    },

    #[error("{kind} entry {key} no longer exists")]
    StaleHandle { kind: CollectionKind, key: EntryKey },

    #[error("Document has not been saved yet")]
    NotPersisted,

    #[error("{operation} request failed: {reason}")]
    TransientRequest { operation: Operation, reason: String },

    #[error("{operation} request was not authorized")]
    Authorization { operation: Operation },
}

impl EditorError {
    pub fn transient(operation: Operation, reason: impl fmt::Display) -> Self {
        EditorError::TransientRequest {
            operation,
            reason: reason.to_string(),
        }
    }

    /// Positional/handle errors are UI bugs, never expected at runtime.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            EditorError::OutOfRange { .. } | EditorError::StaleHandle { .. }
        )
    }

    /// Converts the error into the notice shown to the user.
    pub fn notice(&self) -> Notice {
        match self {
            EditorError::OutOfRange { .. } | EditorError::StaleHandle { .. } => {
                tracing::error!("Editor contract violation: {self}");
                Notice::new(
                    Severity::Danger,
                    "Something went wrong while editing. Please reload the editor.",
                )
            }
            EditorError::NotPersisted => Notice::new(
                Severity::Warning,
                "Please save your resume before exporting or checking its score.",
            ),
            EditorError::TransientRequest { operation, reason } => {
                tracing::warn!("{operation} request failed: {reason}");
                let message = match operation {
                    Operation::Create | Operation::Update => {
                        "Could not save your changes. Retrying shortly."
                    }
                    Operation::Load => "Could not load your resume.",
                    Operation::Export => "Export failed. Please try again.",
                    Operation::ScoreCheck => "ATS check failed. Please try again.",
                };
                Notice::new(Severity::Danger, message)
            }
            EditorError::Authorization { .. } => Notice::new(
                Severity::Danger,
                "Your session has expired. Please sign in again.",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

/// A transient, user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_persisted_prompts_save() {
        let notice = EditorError::NotPersisted.notice();
        assert_eq!(notice.severity, Severity::Warning);
        assert!(notice.message.contains("save"));
    }

    #[test]
    fn test_contract_violations_are_flagged() {
        let err = EditorError::OutOfRange {
            kind: CollectionKind::Skills,
            index: 4,
            len: 2,
        };
        assert!(err.is_contract_violation());
        assert!(!EditorError::NotPersisted.is_contract_violation());
        assert_eq!(err.to_string(), "skills index 4 is out of range (length 2)");
    }

    #[test]
    fn test_transient_message_depends_on_operation() {
        let save = EditorError::transient(Operation::Update, "timeout").notice();
        let export = EditorError::transient(Operation::Export, "503").notice();
        assert!(save.message.contains("save"));
        assert!(export.message.contains("Export"));
    }
}

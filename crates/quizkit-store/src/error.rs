//! Storage error types.
//!
//! Store operations are best-effort at the public boundary: faults are
//! logged and swallowed. The `try_*` variants surface them as
//! [`StoreError`] for callers that need to know.

use std::path::PathBuf;
use thiserror::Error;

/// Persistence-layer fault.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("Failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete write of {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend's byte quota would be exceeded.
    #[error("Storage quota exceeded writing '{key}' ({requested} bytes, {available} available)")]
    QuotaExceeded {
        key: String,
        requested: usize,
        available: usize,
    },

    /// The backend cannot be reached.
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    /// Failed to encode a record.
    #[error("Failed to serialize '{key}'")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored record could not be decoded.
    #[error("Failed to deserialize '{key}'")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A blocking storage task panicked or was cancelled.
    #[error("Storage task failed")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl StoreError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} {}", operation, path.display())
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
            Self::QuotaExceeded { .. } => {
                "There is not enough storage space left to save the quiz.".to_string()
            }
            Self::Unavailable { .. } => "Quiz storage is currently unavailable.".to_string(),
            Self::Serialization { .. } => {
                "An error occurred while saving the quiz data.".to_string()
            }
            Self::Deserialization { key, .. } => {
                format!("Saved data for '{key}' is corrupted and was ignored.")
            }
            Self::Task { .. } => "A background storage task failed.".to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the workspace exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to the workspace.".into())
                }
            }
            Self::AtomicWriteFailed { .. } | Self::QuotaExceeded { .. } => {
                Some("Free up space, remove unused images, or export the quiz to a file.".into())
            }
            Self::Deserialization { .. } => {
                Some("Import the quiz again from an exported archive.".into())
            }
            Self::Unavailable { .. } | Self::Serialization { .. } | Self::Task { .. } => None,
        }
    }
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

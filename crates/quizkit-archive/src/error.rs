//! Error types for archive export and import.

use std::fmt;

use quizkit_model::{PageId, QuestionId};
use thiserror::Error;

/// Kind of id found twice in an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Page,
    Question,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Page => "page",
            Self::Question => "question",
        })
    }
}

/// Fatal archive errors. None of them leave partial state behind.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArchiveError {
    /// The archive has no `quiz/manifest.json`.
    #[error("archive has no quiz/manifest.json")]
    MissingManifest,

    /// The manifest is not a valid manifest record.
    #[error("invalid archive manifest: {source}")]
    InvalidManifest {
        #[source]
        source: serde_json::Error,
    },

    /// The same id appears twice.
    #[error("duplicate {kind} id '{id}' in archive")]
    DuplicateId { kind: IdKind, id: String },

    /// The container is not a readable ZIP file.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error while reading or writing an entry.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode a record.
    #[error("failed to serialize {file}")]
    Serialization {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ArchiveError {
    pub(crate) fn duplicate_page(id: &PageId) -> Self {
        Self::DuplicateId {
            kind: IdKind::Page,
            id: id.to_string(),
        }
    }

    pub(crate) fn duplicate_question(id: &QuestionId) -> Self {
        Self::DuplicateId {
            kind: IdKind::Question,
            id: id.to_string(),
        }
    }

    /// Returns a user-friendly error message suitable for display.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingManifest | Self::InvalidManifest { .. } => {
                "This file is not a quiz archive.".to_string()
            }
            Self::DuplicateId { kind, id } => {
                format!("The archive uses the {kind} id '{id}' more than once and cannot be imported.")
            }
            Self::Zip(_) => "The file is not a valid ZIP archive.".to_string(),
            Self::Io(_) => "Could not read or write the archive.".to_string(),
            Self::Serialization { .. } => {
                "An error occurred while writing the archive.".to_string()
            }
        }
    }
}

/// Problem recovered from during import.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportWarning {
    /// The page's config was missing or unreadable; the page was imported empty.
    #[error("page {page}: config skipped ({reason})")]
    PageSkipped { page: PageId, reason: String },

    /// The page's answers record was unreadable; no answers were imported.
    #[error("page {page}: answers ignored ({reason})")]
    AnswersIgnored { page: PageId, reason: String },

    /// A question's image could not be loaded; the image was dropped.
    #[error("question {question}: image '{path}' not imported ({reason})")]
    AssetUnresolved {
        question: QuestionId,
        path: String,
        reason: String,
    },
}

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

//! Editor error types.

use quizkit_archive::ArchiveError;
use quizkit_model::{ModelError, PageId, QuestionId};
use quizkit_store::StoreError;
use thiserror::Error;

/// Why an editing operation was refused.
///
/// A refused operation leaves the document unchanged.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("unknown page {0}")]
    UnknownPage(PageId),

    /// The question is not on the active page.
    #[error("question {0} is not on the active page")]
    UnknownQuestion(QuestionId),

    /// Questions can only be reordered within the active page.
    #[error("cannot move question {question} to page {page}: questions stay on their page")]
    CrossPageMove { question: QuestionId, page: PageId },

    /// The edit would break a document invariant.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Archive export or import failed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Storage refused data that must not be lost silently (image bytes).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A JSON preview could not be rendered.
    #[error("failed to render preview: {0}")]
    Preview(#[from] serde_json::Error),
}

impl EditorError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownPage(page) => format!("There is no page '{page}'."),
            Self::UnknownQuestion(question) => {
                format!("Question '{question}' is not on the current page.")
            }
            Self::CrossPageMove { .. } => {
                "Questions cannot be moved between pages.".to_string()
            }
            Self::Model(ModelError::TooFewOptions { min, .. }) => {
                format!("A choice question needs at least {min} options.")
            }
            Self::Model(e) => e.to_string(),
            Self::Archive(e) => e.user_message(),
            Self::Store(e) => e.user_message(),
            Self::Preview(_) => "The quiz could not be shown as JSON.".to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::UnknownPage(_) => Some("List the pages to see their ids.".into()),
            Self::UnknownQuestion(_) => {
                Some("Switch to the page that holds the question first.".into())
            }
            Self::CrossPageMove { .. } => Some(
                "Delete the question and add it again on the other page.".into(),
            ),
            Self::Store(e) => e.suggestion(),
            Self::Model(_) | Self::Archive(_) | Self::Preview(_) => None,
        }
    }
}

/// Result type alias for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;

//! Model validation errors.

use thiserror::Error;

use crate::{OptionId, PageId, QuestionId, QuestionType};

/// A structural invariant of the quiz document was violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Select questions need at least two options.
    #[error("question {question} needs at least {min} options, found {found}")]
    TooFewOptions {
        question: QuestionId,
        found: usize,
        min: usize,
    },

    /// Fill-in-the-blank questions carry no options.
    #[error("question {question} is fill-in-the-blank and cannot have options")]
    OptionsNotAllowed { question: QuestionId },

    #[error("question {question} already has an option {option}")]
    DuplicateOptionId {
        question: QuestionId,
        option: OptionId,
    },

    #[error("question {question} has no option {option}")]
    UnknownOption {
        question: QuestionId,
        option: OptionId,
    },

    #[error("unknown question {0}")]
    UnknownQuestion(QuestionId),

    #[error("duplicate page id {0}")]
    DuplicatePageId(PageId),

    #[error("duplicate question id {0}")]
    DuplicateQuestionId(QuestionId),

    /// Unrecognized question type name.
    #[error("unknown question type '{0}'")]
    UnknownQuestionType(String),

    /// Answer value does not fit the question type.
    #[error("invalid answer for {kind} question {question}: {reason}")]
    InvalidAnswer {
        question: QuestionId,
        kind: QuestionType,
        reason: String,
    },
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

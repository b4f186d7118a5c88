//! Quiz document model.
//!
//! This crate holds the types shared by every other quizkit crate:
//!
//! - [`Manifest`] - document-level metadata and page ordering
//! - [`PageContent`] - one page's questions plus the answers scoped to them
//! - [`Question`] - a tagged question variant validated at construction
//! - [`Answers`] - correct answers keyed by question id
//! - [`reorder`] - the move algorithm used for pages, questions, and options
//!
//! # Wire format
//!
//! All types serialize to the JSON records exchanged with the page cache and
//! the archive codec. Field names are camelCase, question types use the
//! `multiple-choice` / `multiple-response` / `fill-in-the-blank` names.

mod answers;
mod asset;
mod document;
mod error;
mod ids;
mod manifest;
mod page;
mod question;
pub mod reorder;

pub use answers::Answers;
pub use asset::{AssetHandle, AssetRef, SESSION_SCHEME};
pub use document::QuizDocument;
pub use error::{ModelError, Result};
pub use ids::{OptionId, PageId, QuestionId};
pub use manifest::{Manifest, ManifestPatch, TimeLimit};
pub use page::{PageContent, PageData, PageRef};
pub use question::{Question, QuestionType, QuizOption};
pub use reorder::{Identified, move_item};

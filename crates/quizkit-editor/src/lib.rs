//! Editing API for quizkit documents.
//!
//! Exactly one page is held in memory and mutable at a time, the *active
//! page*. Every other page lives in the page cache of a
//! [`QuizStore`](quizkit_store::QuizStore) and is only materialized when
//! the document is assembled for preview or export.
//!
//! # Example
//!
//! ```ignore
//! use quizkit_editor::{AutoSaveConfig, Editor};
//! use quizkit_model::QuestionType;
//! use quizkit_store::QuizStore;
//!
//! let editor = Editor::open(QuizStore::open_dir("./my-quiz")?, AutoSaveConfig::default()).await;
//! let question = editor.add_question(QuestionType::SingleSelect, None).await;
//! editor.flush().await;
//! let zip = editor.export_document().await?;
//! ```
//!
//! # Architecture
//!
//! - `buffer` - [`ActivePage`], mutations of the active page
//! - `assembler` - [`DocumentAssembler`], pages from buffer and cache
//! - `autosave/` - When a dirty buffer is flushed
//! - `editor` - [`Editor`], the serialized facade over all of the above

mod assembler;
mod autosave;
mod buffer;
mod editor;
mod error;

pub use assembler::{DocumentAssembler, IMAGE_PLACEHOLDER};
pub use autosave::{AutoSaveConfig, DirtyTracker};
pub use buffer::ActivePage;
pub use editor::{Editor, ImportReport};
pub use error::{EditorError, Result};

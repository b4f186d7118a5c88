//! Portable ZIP archives for quizkit documents.
//!
//! An archive holds the whole document, images included, so it can be moved
//! between workspaces and machines:
//!
//! ```text
//! quiz/manifest.json                      name, time limits, page order
//! quiz/page_<id>/page_config.json         questions, images as assets/<file>
//! quiz/page_<id>/answers.json             answers for this page's questions
//! quiz/page_<id>/assets/<question>.<ext>  image bytes
//! ```
//!
//! Export pulls pages one at a time through a [`PageProvider`]; import
//! validates the whole archive before touching the workspace and then
//! replaces it.

mod error;
mod export;
mod image;
mod import;
pub mod layout;
mod records;

pub use error::{ArchiveError, IdKind, ImportWarning, Result};
pub use export::{ArchiveWriter, PageProvider, export_document};
pub use image::sniff_extension;
pub use import::{ImportOutcome, import_document};
pub use layout::suggested_file_name;
pub use records::{ArchiveManifest, ArchivePageEntry, PageConfig};

//! Persistent storage for quizkit documents.
//!
//! A quiz is never held in memory as a whole. This crate keeps its parts in
//! a key/blob backend instead:
//!
//! - **Manifest store**: document metadata, time limits and page order
//! - **Page cache**: the `{questions, answers}` of every page that is not
//!   currently being edited
//! - **Session assets**: image bytes behind `session:<uuid>` handles
//!
//! # Fault model
//!
//! Storage is best-effort. The plain operations log faults with
//! `tracing::error!` and degrade to "absent" or no-op so an editing session
//! is never interrupted by a full disk. The `try_*` variants return
//! [`StoreError`] for callers that must know.
//!
//! # Example
//!
//! ```ignore
//! use quizkit_store::QuizStore;
//! use quizkit_model::ManifestPatch;
//!
//! let store = QuizStore::open_dir("./my-quiz")?;
//! let manifest = store.manifest.update(ManifestPatch::default().name("Capitals")).await;
//! ```
//!
//! # Architecture
//!
//! - `backend/` - [`StorageBackend`] trait with memory and directory implementations
//! - `manifest.rs` - [`ManifestStore`]
//! - `page_cache.rs` - [`PageCache`]
//! - `assets.rs` - [`SessionAssets`]
//! - `error.rs` - Error types with user-friendly messages

mod assets;
pub mod backend;
mod error;
mod manifest;
mod page_cache;

use std::path::PathBuf;
use std::sync::Arc;

pub use assets::SessionAssets;
pub use backend::{DirectoryBackend, MemoryBackend, SharedBackend, StorageBackend};
pub use error::{Result, StoreError};
pub use manifest::ManifestStore;
pub use page_cache::PageCache;

/// The three stores of one workspace, sharing a single backend.
#[derive(Debug, Clone)]
pub struct QuizStore {
    pub manifest: Arc<ManifestStore>,
    pub pages: PageCache,
    pub assets: SessionAssets,
}

impl QuizStore {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            manifest: Arc::new(ManifestStore::new(Arc::clone(&backend))),
            pages: PageCache::new(Arc::clone(&backend)),
            assets: SessionAssets::new(backend),
        }
    }

    /// Ephemeral store; everything is lost when it is dropped.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Store backed by the directory at `root`, created if missing.
    pub fn open_dir(root: impl Into<PathBuf>) -> Result<Self> {
        let backend = DirectoryBackend::open(root)?;
        tracing::debug!(root = %backend.root().display(), "opened workspace directory");
        Ok(Self::new(Arc::new(backend)))
    }
}

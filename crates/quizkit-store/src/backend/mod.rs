//! Key/blob persistence backends.
//!
//! Every store in this crate talks to persistence through
//! [`StorageBackend`]; nothing else touches files or memory maps directly.
//! Keys are namespaced strings (`manifest`, `page/<id>`, `asset/<uuid>`).

mod directory;
mod memory;

use std::fmt;
use std::sync::Arc;

pub use directory::DirectoryBackend;
pub use memory::MemoryBackend;

use crate::error::{Result, StoreError};

/// Blocking key/blob store.
///
/// Implementations must make `write` atomic per key: a concurrent `read`
/// sees either the old or the new blob, never a torn one.
pub trait StorageBackend: Send + Sync + fmt::Debug {
    /// Read a blob, `None` when the key is absent.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Create or overwrite a blob.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Remove a blob. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys starting with `prefix`.
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Backend shared between the stores of one workspace.
pub type SharedBackend = Arc<dyn StorageBackend>;

/// Run a backend call on the blocking thread pool.
pub(crate) async fn blocking<T, F>(backend: &SharedBackend, call: F) -> Result<T>
where
    F: FnOnce(&dyn StorageBackend) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let backend = Arc::clone(backend);
    tokio::task::spawn_blocking(move || call(backend.as_ref()))
        .await
        .map_err(|source| StoreError::Task { source })?
}

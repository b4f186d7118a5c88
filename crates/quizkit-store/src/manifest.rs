//! Manifest store.

use quizkit_model::{Manifest, ManifestPatch};
use tokio::sync::Mutex;

use crate::backend::{SharedBackend, blocking};
use crate::error::{Result, StoreError};

const MANIFEST_KEY: &str = "manifest";

/// Durable record of document metadata and page order.
///
/// Every update is a full read-modify-write against the backend. Updates are
/// serialized by an internal lock and the backend writes atomically, so a
/// reader never observes a half-merged manifest.
#[derive(Debug)]
pub struct ManifestStore {
    backend: SharedBackend,
    write_lock: Mutex<()>,
}

impl ManifestStore {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Last persisted manifest, or an empty default.
    ///
    /// Faults are logged and yield the default.
    pub async fn load(&self) -> Manifest {
        match self.try_load().await {
            Ok(manifest) => manifest.unwrap_or_default(),
            Err(e) => {
                tracing::error!(error = %e, "failed to load manifest");
                Manifest::default()
            }
        }
    }

    pub async fn try_load(&self) -> Result<Option<Manifest>> {
        let Some(bytes) = blocking(&self.backend, |b| b.read(MANIFEST_KEY)).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Deserialization {
                key: MANIFEST_KEY.to_string(),
                source,
            })
    }

    /// Merge `patch` into the persisted manifest and return the result.
    ///
    /// Best-effort: if the backend fails the merged manifest is still
    /// returned, but it may not be durable. An unreadable manifest is
    /// replaced by the default merged with `patch`.
    pub async fn update(&self, patch: ManifestPatch) -> Manifest {
        let _guard = self.write_lock.lock().await;
        let mut manifest = match self.try_load().await {
            Ok(current) => current.unwrap_or_default(),
            Err(e) => {
                tracing::error!(error = %e, "failed to read manifest before update");
                Manifest::default()
            }
        };
        manifest.apply(patch);
        if let Err(e) = self.persist(&manifest).await {
            tracing::error!(error = %e, "failed to persist manifest update");
        }
        manifest
    }

    /// Like [`ManifestStore::update`] but surfaces faults.
    pub async fn try_update(&self, patch: ManifestPatch) -> Result<Manifest> {
        let _guard = self.write_lock.lock().await;
        let mut manifest = self.try_load().await?.unwrap_or_default();
        manifest.apply(patch);
        self.persist(&manifest).await?;
        Ok(manifest)
    }

    /// Overwrite the persisted manifest wholesale.
    ///
    /// Used when a whole document is swapped in, where fields absent from
    /// the new manifest (such as the active page) must not survive.
    pub async fn replace(&self, manifest: Manifest) -> Manifest {
        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.persist(&manifest).await {
            tracing::error!(error = %e, "failed to persist replacement manifest");
        }
        manifest
    }

    /// Remove the persisted manifest.
    pub async fn clear(&self) {
        let _guard = self.write_lock.lock().await;
        if let Err(e) = blocking(&self.backend, |b| b.remove(MANIFEST_KEY)).await {
            tracing::error!(error = %e, "failed to clear manifest");
        }
    }

    async fn persist(&self, manifest: &Manifest) -> Result<()> {
        let bytes =
            serde_json::to_vec_pretty(manifest).map_err(|source| StoreError::Serialization {
                key: MANIFEST_KEY.to_string(),
                source,
            })?;
        blocking(&self.backend, move |b| b.write(MANIFEST_KEY, &bytes)).await
    }
}

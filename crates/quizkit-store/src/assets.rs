//! Session asset registry.

use quizkit_model::AssetHandle;
use uuid::Uuid;

use crate::backend::{SharedBackend, blocking};
use crate::error::Result;

const ASSET_PREFIX: &str = "asset/";

fn asset_key(handle: AssetHandle) -> String {
    format!("{ASSET_PREFIX}{}", handle.uuid())
}

/// Resolves session handles to image bytes.
///
/// Handles are only valid for the registry that issued them. With a
/// [`crate::MemoryBackend`] they die with the process; with a
/// [`crate::DirectoryBackend`] they live as long as the workspace.
#[derive(Debug, Clone)]
pub struct SessionAssets {
    backend: SharedBackend,
}

impl SessionAssets {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Store image bytes and issue a fresh handle.
    ///
    /// Unlike the other operations this one reports faults: a caller that
    /// cannot register the bytes must not reference them.
    pub async fn register(&self, bytes: Vec<u8>) -> Result<AssetHandle> {
        let handle = AssetHandle::generate();
        let key = asset_key(handle);
        let size = bytes.len();
        blocking(&self.backend, move |b| b.write(&key, &bytes)).await?;
        tracing::debug!(%handle, bytes = size, "registered session asset");
        Ok(handle)
    }

    /// Bytes behind `handle`, `None` if unknown or unreadable.
    pub async fn fetch(&self, handle: AssetHandle) -> Option<Vec<u8>> {
        let key = asset_key(handle);
        match blocking(&self.backend, move |b| b.read(&key)).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(%handle, error = %e, "failed to fetch session asset");
                None
            }
        }
    }

    /// Forget `handle`. Idempotent.
    pub async fn release(&self, handle: AssetHandle) {
        let key = asset_key(handle);
        if let Err(e) = blocking(&self.backend, move |b| b.remove(&key)).await {
            tracing::error!(%handle, error = %e, "failed to release session asset");
        }
    }

    /// Forget every handle.
    pub async fn clear(&self) {
        let result = blocking(&self.backend, |b| {
            for key in b.keys(ASSET_PREFIX)? {
                b.remove(&key)?;
            }
            Ok(())
        })
        .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "failed to clear session assets");
        }
    }

    pub async fn handles(&self) -> Vec<AssetHandle> {
        match blocking(&self.backend, |b| b.keys(ASSET_PREFIX)).await {
            Ok(keys) => keys
                .iter()
                .filter_map(|key| key.strip_prefix(ASSET_PREFIX))
                .filter_map(|raw| Uuid::parse_str(raw).ok())
                .map(AssetHandle::from_uuid)
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, "failed to list session assets");
                Vec::new()
            }
        }
    }
}

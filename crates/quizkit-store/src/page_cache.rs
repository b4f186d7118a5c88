//! Per-page content cache.

use quizkit_model::{PageData, PageId};

use crate::backend::{SharedBackend, blocking};
use crate::error::{Result, StoreError};

const PAGE_PREFIX: &str = "page/";

fn page_key(id: &PageId) -> String {
    format!("{PAGE_PREFIX}{id}")
}

/// Keyed store of page content, independent of the in-memory working set.
///
/// Entries are JSON blobs of `{questions, answers}`; the cache does not
/// check them beyond decoding. All faults are logged and degrade to
/// "absent" for reads and no-ops for writes.
#[derive(Debug, Clone)]
pub struct PageCache {
    backend: SharedBackend,
}

impl PageCache {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Store `data` for `page`, overwriting any previous entry.
    pub async fn put(&self, page: &PageId, data: &PageData) {
        if let Err(e) = self.try_put(page, data).await {
            tracing::error!(page = %page, error = %e, "failed to cache page");
        }
    }

    pub async fn try_put(&self, page: &PageId, data: &PageData) -> Result<()> {
        let key = page_key(page);
        let bytes = serde_json::to_vec(data).map_err(|source| StoreError::Serialization {
            key: key.clone(),
            source,
        })?;
        tracing::debug!(page = %page, questions = data.questions.len(), "caching page");
        blocking(&self.backend, move |b| b.write(&key, &bytes)).await
    }

    pub async fn get(&self, page: &PageId) -> Option<PageData> {
        match self.try_get(page).await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(page = %page, error = %e, "failed to read cached page");
                None
            }
        }
    }

    pub async fn try_get(&self, page: &PageId) -> Result<Option<PageData>> {
        let key = page_key(page);
        let read_key = key.clone();
        let Some(bytes) = blocking(&self.backend, move |b| b.read(&read_key)).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Deserialization { key, source })
    }

    /// Drop the entry for `page`. Idempotent.
    pub async fn delete(&self, page: &PageId) {
        let key = page_key(page);
        if let Err(e) = blocking(&self.backend, move |b| b.remove(&key)).await {
            tracing::error!(page = %page, error = %e, "failed to delete cached page");
        }
    }

    /// Drop every cached page.
    pub async fn clear(&self) {
        let result = blocking(&self.backend, |b| {
            for key in b.keys(PAGE_PREFIX)? {
                b.remove(&key)?;
            }
            Ok(())
        })
        .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "failed to clear page cache");
        }
    }

    /// Ids of all cached pages, sorted.
    pub async fn page_ids(&self) -> Vec<PageId> {
        match blocking(&self.backend, |b| b.keys(PAGE_PREFIX)).await {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|key| key.strip_prefix(PAGE_PREFIX).map(PageId::from))
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, "failed to list cached pages");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use quizkit_model::{Answers, Question};

    use super::*;
    use crate::backend::MemoryBackend;

    fn sample() -> PageData {
        let question = Question::fill_in_blank("q1", "Capital of France?");
        let mut answers = Answers::new();
        answers.set(&question, "Paris").unwrap();
        PageData {
            questions: vec![question],
            answers,
        }
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let cache = PageCache::new(Arc::new(MemoryBackend::new()));
        let page = PageId::from("page-1");
        assert_eq!(cache.get(&page).await, None);

        cache.put(&page, &sample()).await;
        assert_eq!(cache.get(&page).await, Some(sample()));

        cache.delete(&page).await;
        cache.delete(&page).await;
        assert_eq!(cache.get(&page).await, None);
    }

    #[tokio::test]
    async fn test_clear_only_touches_pages() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = PageCache::new(backend.clone());
        cache.put(&"a".into(), &PageData::default()).await;
        cache.put(&"b".into(), &PageData::default()).await;
        crate::backend::StorageBackend::write(backend.as_ref(), "manifest", b"{}").unwrap();

        assert_eq!(cache.page_ids().await, vec![PageId::from("a"), PageId::from("b")]);
        cache.clear().await;
        assert!(cache.page_ids().await.is_empty());
        assert!(
            crate::backend::StorageBackend::read(backend.as_ref(), "manifest")
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_corrupt_blob_reads_as_absent() {
        let backend = Arc::new(MemoryBackend::new());
        crate::backend::StorageBackend::write(backend.as_ref(), "page/p1", b"not json").unwrap();
        let cache = PageCache::new(backend);
        let page = PageId::from("p1");
        assert!(matches!(
            cache.try_get(&page).await,
            Err(StoreError::Deserialization { .. })
        ));
        assert_eq!(cache.get(&page).await, None);
    }
}

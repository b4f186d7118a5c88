//! Store behaviour when the backend misbehaves.

use std::sync::Arc;

use quizkit_model::{ManifestPatch, PageData, PageId, PageRef};
use quizkit_store::{QuizStore, Result, StorageBackend, StoreError};

/// Backend whose every call fails.
#[derive(Debug)]
struct UnavailableBackend;

impl UnavailableBackend {
    fn fault() -> StoreError {
        StoreError::Unavailable {
            reason: "storage disabled".to_string(),
        }
    }
}

impl StorageBackend for UnavailableBackend {
    fn read(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Err(Self::fault())
    }

    fn write(&self, _key: &str, _bytes: &[u8]) -> Result<()> {
        Err(Self::fault())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Err(Self::fault())
    }

    fn keys(&self, _prefix: &str) -> Result<Vec<String>> {
        Err(Self::fault())
    }
}

#[tokio::test]
async fn unavailable_backend_degrades_to_defaults() {
    let store = QuizStore::new(Arc::new(UnavailableBackend));
    let page = PageId::from("page-1");

    let merged = store
        .manifest
        .update(
            ManifestPatch::default()
                .name("Offline quiz")
                .page_order(vec![PageRef::new("page-1", "Page 1")]),
        )
        .await;
    assert_eq!(merged.name, "Offline quiz");
    assert_eq!(merged.total_pages, 1);
    assert_eq!(store.manifest.load().await.name, "");

    store.pages.put(&page, &PageData::default()).await;
    assert_eq!(store.pages.get(&page).await, None);
    store.pages.delete(&page).await;
    store.pages.clear().await;
    assert!(store.pages.page_ids().await.is_empty());

    assert!(store.assets.register(vec![1, 2, 3]).await.is_err());
    assert!(store.assets.handles().await.is_empty());
}

#[tokio::test]
async fn try_variants_surface_faults() {
    let store = QuizStore::new(Arc::new(UnavailableBackend));
    let err = store
        .manifest
        .try_update(ManifestPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unavailable { .. }));
    assert!(store.pages.try_get(&"p".into()).await.is_err());
}

#[tokio::test]
async fn directory_workspace_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let page = PageId::from("page-1");

    {
        let store = QuizStore::open_dir(dir.path()).unwrap();
        store
            .manifest
            .update(ManifestPatch::default().name("Persistent"))
            .await;
        store.pages.put(&page, &PageData::default()).await;
    }

    let reopened = QuizStore::open_dir(dir.path()).unwrap();
    assert_eq!(reopened.manifest.load().await.name, "Persistent");
    assert_eq!(reopened.pages.page_ids().await, vec![page]);
}

#[tokio::test]
async fn directory_workspace_keeps_long_page_ids() {
    let dir = tempfile::tempdir().unwrap();
    let store = QuizStore::open_dir(dir.path()).unwrap();
    let page = PageId::from("p".repeat(200).as_str());

    store.pages.try_put(&page, &PageData::default()).await.unwrap();
    assert_eq!(store.pages.get(&page).await, Some(PageData::default()));

    let reopened = QuizStore::open_dir(dir.path()).unwrap();
    assert_eq!(reopened.pages.page_ids().await, vec![page]);
}

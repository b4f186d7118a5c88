//! Document assembly from the manifest, page cache, and active buffer.

use quizkit_archive::PageProvider;
use quizkit_model::{Manifest, PageContent, PageRef, QuizDocument, SESSION_SCHEME};
use quizkit_store::PageCache;
use serde_json::{Value, json};

use crate::error::Result;

/// Stand-in for session images in JSON previews.
pub const IMAGE_PLACEHOLDER: &str = "[Image data not included in JSON]";

/// Read-only view that materializes pages on demand.
///
/// The active page comes from the buffer, every other page from the cache;
/// a page with no cache entry is empty.
#[derive(Debug, Clone, Copy)]
pub struct DocumentAssembler<'a> {
    manifest: &'a Manifest,
    active: &'a PageContent,
    cache: &'a PageCache,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(manifest: &'a Manifest, active: &'a PageContent, cache: &'a PageCache) -> Self {
        Self {
            manifest,
            active,
            cache,
        }
    }

    pub async fn page(&self, page: &PageRef) -> PageContent {
        let mut content = if page.id == self.active.id {
            self.active.clone()
        } else {
            match self.cache.get(&page.id).await {
                Some(data) => PageContent::from_data(page, data),
                None => PageContent::empty(page),
            }
        };
        content.title.clone_from(&page.title);
        content.time_limit = self.manifest.time_limit.per_page();
        content
    }

    /// Every page in manifest order.
    pub async fn document(&self) -> QuizDocument {
        let mut pages = Vec::with_capacity(self.manifest.page_order.len());
        for page in &self.manifest.page_order {
            pages.push(self.page(page).await);
        }
        QuizDocument {
            manifest: self.manifest.clone(),
            pages,
        }
    }

    /// Pretty-printed preview of one page.
    pub async fn page_json(&self, page: &PageRef) -> Result<String> {
        let content = self.page(page).await;
        Ok(serde_json::to_string_pretty(&page_preview(&content)?)?)
    }

    /// Pretty-printed preview of the whole quiz.
    pub async fn document_json(&self) -> Result<String> {
        let mut pages = Vec::with_capacity(self.manifest.page_order.len());
        for page in &self.manifest.page_order {
            pages.push(page_preview(&self.page(page).await)?);
        }
        let preview = json!({
            "name": self.manifest.name,
            "description": self.manifest.description,
            "pages": pages,
            "globalTimeLimit": self.manifest.time_limit.global(),
            "pageTimeLimit": self.manifest.time_limit.per_page(),
        });
        Ok(serde_json::to_string_pretty(&preview)?)
    }
}

impl PageProvider for DocumentAssembler<'_> {
    async fn page(&self, page: &PageRef) -> PageContent {
        DocumentAssembler::page(self, page).await
    }
}

fn page_preview(content: &PageContent) -> Result<Value> {
    let mut value = serde_json::to_value(content)?;
    if let Some(questions) = value.get_mut("questions").and_then(Value::as_array_mut) {
        for question in questions {
            if let Some(image) = question.get_mut("image")
                && image.as_str().is_some_and(|s| s.starts_with(SESSION_SCHEME))
            {
                *image = Value::String(IMAGE_PLACEHOLDER.to_string());
            }
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use quizkit_model::{AssetHandle, PageData, Question, TimeLimit};
    use quizkit_store::MemoryBackend;

    use super::*;

    fn manifest() -> Manifest {
        Manifest {
            name: "Capitals".into(),
            time_limit: TimeLimit::PerPage(4),
            page_order: vec![
                PageRef::new("page-1", "Europe"),
                PageRef::new("page-2", "Asia"),
                PageRef::new("page-3", "Africa"),
            ],
            ..Manifest::default()
        }
    }

    #[tokio::test]
    async fn test_pages_come_from_buffer_cache_or_nowhere() {
        let manifest = manifest();
        let cache = PageCache::new(Arc::new(MemoryBackend::new()));
        cache
            .put(
                &"page-2".into(),
                &PageData {
                    questions: vec![Question::fill_in_blank("q2", "Capital of Japan?")],
                    ..PageData::default()
                },
            )
            .await;
        let mut active = PageContent::empty(&manifest.page_order[0]);
        active
            .questions
            .push(Question::fill_in_blank("q1", "Capital of France?"));

        let assembler = DocumentAssembler::new(&manifest, &active, &cache);
        let document = assembler.document().await;

        assert_eq!(document.pages.len(), 3);
        assert_eq!(document.pages[0].questions[0].id().as_str(), "q1");
        assert_eq!(document.pages[1].questions[0].id().as_str(), "q2");
        assert_eq!(document.pages[1].title, "Asia");
        assert!(document.pages[2].is_empty());
        assert!(document.pages.iter().all(|page| page.time_limit == Some(4)));
        assert_eq!(document.question_count(), 2);
    }

    #[tokio::test]
    async fn test_json_preview_hides_session_images() {
        let manifest = manifest();
        let cache = PageCache::new(Arc::new(MemoryBackend::new()));
        let mut active = PageContent::empty(&manifest.page_order[0]);
        active.questions.push(
            Question::fill_in_blank("q1", "Which flag?").with_image(AssetHandle::generate().into()),
        );
        let assembler = DocumentAssembler::new(&manifest, &active, &cache);

        let page: Value =
            serde_json::from_str(&assembler.page_json(&manifest.page_order[0]).await.unwrap())
                .unwrap();
        assert_eq!(page["title"], "Europe");
        assert_eq!(page["timeLimit"], 4);
        assert_eq!(page["questions"][0]["image"], IMAGE_PLACEHOLDER);

        let document: Value =
            serde_json::from_str(&assembler.document_json().await.unwrap()).unwrap();
        assert_eq!(document["name"], "Capitals");
        assert_eq!(document["pages"].as_array().unwrap().len(), 3);
        assert!(document["globalTimeLimit"].is_null());
        assert_eq!(document["pageTimeLimit"], 4);
        assert_eq!(
            document["pages"][0]["questions"][0]["image"],
            IMAGE_PLACEHOLDER
        );
    }
}

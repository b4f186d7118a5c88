//! The editing facade.

use quizkit_archive::{ImportWarning, export_document, import_document};
use quizkit_model::{
    AssetHandle, AssetRef, Manifest, ManifestPatch, OptionId, PageContent, PageId, PageRef,
    Question, QuestionId, QuestionType, QuizDocument, TimeLimit, move_item,
};
use quizkit_store::QuizStore;
use tokio::sync::Mutex;

use crate::assembler::DocumentAssembler;
use crate::autosave::{AutoSaveConfig, DirtyTracker};
use crate::buffer::ActivePage;
use crate::error::{EditorError, Result};

/// Summary of a finished import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub pages: usize,
    pub questions: usize,
    pub warnings: Vec<ImportWarning>,
}

/// Working state guarded by the editor lock.
#[derive(Debug)]
struct EditorState {
    /// Authoritative in-memory manifest; every change is also sent to the
    /// manifest store as a patch.
    manifest: Manifest,
    buffer: ActivePage,
    tracker: DirtyTracker,
}

/// Edits one quiz document stored in a [`QuizStore`].
///
/// All operations take the same async lock, so they run one at a time in
/// arrival order. In particular a page switch (flush, fetch, swap) always
/// completes before the next queued operation starts.
#[derive(Debug)]
pub struct Editor {
    store: QuizStore,
    autosave: AutoSaveConfig,
    state: Mutex<EditorState>,
}

impl Editor {
    /// Open the document in `store`.
    ///
    /// An empty workspace gets a first page, `page-1` titled "Page 1". The
    /// active page is the one recorded in the manifest, or the first page
    /// when that is missing.
    pub async fn open(store: QuizStore, autosave: AutoSaveConfig) -> Self {
        let mut manifest = store.manifest.load().await;
        let mut patch = ManifestPatch::default();

        if manifest.page_order.is_empty() {
            let page = PageRef::new("page-1", "Page 1");
            patch = patch.page_order(vec![page]).total_questions(0);
        }
        manifest.apply(patch.clone());

        let active = match &manifest.active_page {
            Some(id) if manifest.contains_page(id) => id.clone(),
            _ => manifest.page_order[0].id.clone(),
        };
        if manifest.active_page.as_ref() != Some(&active) {
            patch = patch.active_page(active.clone());
            manifest.apply(ManifestPatch::default().active_page(active.clone()));
        }
        if patch != ManifestPatch::default() {
            store.manifest.update(patch).await;
        }

        let page = manifest.page_order[manifest.page_index(&active).unwrap_or(0)].clone();
        let content = load_page(&store, &manifest, &page).await;
        tracing::debug!(page = %page.id, pages = manifest.total_pages, "opened quiz");

        Self {
            store,
            autosave,
            state: Mutex::new(EditorState {
                manifest,
                buffer: ActivePage::new(content),
                tracker: DirtyTracker::new(),
            }),
        }
    }

    pub fn store(&self) -> &QuizStore {
        &self.store
    }

    pub fn autosave_config(&self) -> &AutoSaveConfig {
        &self.autosave
    }

    pub async fn manifest(&self) -> Manifest {
        self.state.lock().await.manifest.clone()
    }

    /// Snapshot of the active page.
    pub async fn active_page(&self) -> PageContent {
        self.state.lock().await.buffer.content().clone()
    }

    pub async fn is_dirty(&self) -> bool {
        self.state.lock().await.tracker.is_dirty()
    }

    // -- Pages --

    /// Append a page and make it active. Without a title it is named
    /// "Page N".
    pub async fn add_page(&self, title: Option<String>) -> PageRef {
        let mut state = self.state.lock().await;
        let title =
            title.unwrap_or_else(|| format!("Page {}", state.manifest.page_order.len() + 1));
        let page = PageRef::new(PageId::generate(), title);

        let mut order = state.manifest.page_order.clone();
        order.push(page.clone());
        self.commit(&mut state, ManifestPatch::default().page_order(order)).await;
        self.switch_locked(&mut state, &page).await;
        tracing::debug!(page = %page.id, "added page");
        page
    }

    /// Delete a page with its questions, answers, and images.
    ///
    /// Deleting the active page activates the first remaining one; deleting
    /// the last page leaves a fresh empty page behind.
    pub async fn delete_page(&self, id: &PageId) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.manifest.contains_page(id) {
            return Err(EditorError::UnknownPage(id.clone()));
        }

        let was_active = state.buffer.id() == id;
        let questions: Vec<Question> = if was_active {
            state.buffer.content().questions.clone()
        } else {
            self.store
                .pages
                .get(id)
                .await
                .map(|data| data.questions)
                .unwrap_or_default()
        };
        for question in &questions {
            self.release_image(question.image()).await;
        }
        self.store.pages.delete(id).await;

        let mut order = state.manifest.page_order.clone();
        order.retain(|page| &page.id != id);
        let next = if order.is_empty() {
            let fresh = PageRef::new(PageId::generate(), "Page 1");
            order.push(fresh.clone());
            Some(fresh)
        } else if was_active {
            Some(order[0].clone())
        } else {
            None
        };

        let total = state.manifest.total_questions.saturating_sub(questions.len());
        self.commit(
            &mut state,
            ManifestPatch::default()
                .page_order(order)
                .total_questions(total),
        )
        .await;

        if let Some(next) = next {
            // The deleted page's buffer is discarded, not flushed.
            let content = load_page(&self.store, &state.manifest, &next).await;
            state.buffer = ActivePage::new(content);
            state.tracker.mark_flushed();
            self.commit(&mut state, ManifestPatch::default().active_page(next.id)).await;
        }
        tracing::debug!(page = %id, questions = questions.len(), "deleted page");
        Ok(())
    }

    pub async fn rename_page(&self, id: &PageId, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        let mut state = self.state.lock().await;
        let Some(index) = state.manifest.page_index(id) else {
            return Err(EditorError::UnknownPage(id.clone()));
        };
        let mut order = state.manifest.page_order.clone();
        order[index].title.clone_from(&title);
        if state.buffer.id() == id {
            state.buffer.set_title(title);
        }
        self.commit(&mut state, ManifestPatch::default().page_order(order)).await;
        Ok(())
    }

    /// Make `id` the active page. Switching to the active page is a no-op.
    pub async fn switch_page(&self, id: &PageId) -> Result<()> {
        let mut state = self.state.lock().await;
        let page = state
            .manifest
            .page(id)
            .cloned()
            .ok_or_else(|| EditorError::UnknownPage(id.clone()))?;
        self.switch_locked(&mut state, &page).await;
        Ok(())
    }

    /// Move page `source` to the position of `target`.
    pub async fn reorder_pages(&self, source: &PageId, target: &PageId) -> bool {
        let mut state = self.state.lock().await;
        let mut order = state.manifest.page_order.clone();
        if !move_item(&mut order, source, target) {
            return false;
        }
        self.commit(&mut state, ManifestPatch::default().page_order(order)).await;
        true
    }

    // -- Questions --

    /// Add a question to the active page. Without text it is named
    /// "Question N".
    pub async fn add_question(&self, kind: QuestionType, text: Option<String>) -> QuestionId {
        let mut state = self.state.lock().await;
        let text =
            text.unwrap_or_else(|| format!("Question {}", state.buffer.question_count() + 1));
        let id = state.buffer.add_question(kind, text);
        let total = state.manifest.total_questions + 1;
        self.commit(&mut state, ManifestPatch::default().total_questions(total)).await;
        state.tracker.mark_dirty();
        id
    }

    pub async fn update_question(&self, id: &QuestionId, text: impl Into<String>) -> Result<()> {
        let mut state = self.state.lock().await;
        state.buffer.update_question(id, text)?;
        state.tracker.mark_dirty();
        Ok(())
    }

    pub async fn change_question_type(&self, id: &QuestionId, kind: QuestionType) -> Result<()> {
        let mut state = self.state.lock().await;
        state.buffer.change_question_type(id, kind)?;
        state.tracker.mark_dirty();
        Ok(())
    }

    /// Delete a question, its answer, and its image.
    pub async fn delete_question(&self, id: &QuestionId) -> Result<()> {
        let mut state = self.state.lock().await;
        let removed = state.buffer.delete_question(id)?;
        self.release_image(removed.image()).await;
        let total = state.manifest.total_questions.saturating_sub(1);
        self.commit(&mut state, ManifestPatch::default().total_questions(total)).await;
        state.tracker.mark_dirty();
        Ok(())
    }

    pub async fn reorder_questions(&self, source: &QuestionId, target: &QuestionId) -> bool {
        let mut state = self.state.lock().await;
        let moved = state.buffer.reorder_questions(source, target);
        if moved {
            state.tracker.mark_dirty();
        }
        moved
    }

    /// Questions never leave their page.
    pub fn move_question_to_page(&self, question: &QuestionId, page: &PageId) -> Result<()> {
        Err(EditorError::CrossPageMove {
            question: question.clone(),
            page: page.clone(),
        })
    }

    /// Attach image bytes to a question, releasing any previous image.
    pub async fn set_question_image(
        &self,
        id: &QuestionId,
        bytes: Vec<u8>,
    ) -> Result<AssetHandle> {
        let mut state = self.state.lock().await;
        state.buffer.question(id)?;
        let handle = self.store.assets.register(bytes).await?;
        let previous = state.buffer.set_image(id, Some(handle.into()))?;
        self.release_image(previous.as_ref()).await;
        state.tracker.mark_dirty();
        Ok(handle)
    }

    pub async fn clear_question_image(&self, id: &QuestionId) -> Result<()> {
        let mut state = self.state.lock().await;
        let previous = state.buffer.set_image(id, None)?;
        if previous.is_some() {
            self.release_image(previous.as_ref()).await;
            state.tracker.mark_dirty();
        }
        Ok(())
    }

    // -- Options and answers --

    pub async fn add_option(
        &self,
        question: &QuestionId,
        text: impl Into<String>,
    ) -> Result<OptionId> {
        let mut state = self.state.lock().await;
        let id = state.buffer.add_option(question, text)?;
        state.tracker.mark_dirty();
        Ok(id)
    }

    pub async fn update_option(
        &self,
        question: &QuestionId,
        option: &OptionId,
        text: impl Into<String>,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        state.buffer.update_option(question, option, text)?;
        state.tracker.mark_dirty();
        Ok(())
    }

    pub async fn delete_option(&self, question: &QuestionId, option: &OptionId) -> Result<()> {
        let mut state = self.state.lock().await;
        state.buffer.delete_option(question, option)?;
        state.tracker.mark_dirty();
        Ok(())
    }

    pub async fn reorder_options(
        &self,
        question: &QuestionId,
        source: &OptionId,
        target: &OptionId,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;
        let moved = state.buffer.reorder_options(question, source, target)?;
        if moved {
            state.tracker.mark_dirty();
        }
        Ok(moved)
    }

    /// Returns whether `value` is part of the answer afterwards.
    pub async fn set_answer(&self, question: &QuestionId, value: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let selected = state.buffer.set_answer(question, value)?;
        state.tracker.mark_dirty();
        Ok(selected)
    }

    // -- Metadata --

    pub async fn set_name(&self, name: impl Into<String>) {
        let mut state = self.state.lock().await;
        self.commit(&mut state, ManifestPatch::default().name(name)).await;
    }

    pub async fn set_description(&self, description: impl Into<String>) {
        let mut state = self.state.lock().await;
        self.commit(&mut state, ManifestPatch::default().description(description)).await;
    }

    /// Set the time limit. Setting one kind of limit clears the other.
    pub async fn set_time_limit(&self, limit: TimeLimit) {
        let mut state = self.state.lock().await;
        self.commit(&mut state, ManifestPatch::default().time_limit(limit)).await;
        state.buffer.set_time_limit(limit.per_page());
    }

    // -- Assembly, export, import --

    /// Materialize the whole document.
    pub async fn document(&self) -> QuizDocument {
        let state = self.state.lock().await;
        self.assembler(&state).document().await
    }

    pub async fn page(&self, id: &PageId) -> Result<PageContent> {
        let state = self.state.lock().await;
        let page = state
            .manifest
            .page(id)
            .ok_or_else(|| EditorError::UnknownPage(id.clone()))?;
        Ok(self.assembler(&state).page(page).await)
    }

    pub async fn page_json(&self, id: &PageId) -> Result<String> {
        let state = self.state.lock().await;
        let page = state
            .manifest
            .page(id)
            .ok_or_else(|| EditorError::UnknownPage(id.clone()))?;
        self.assembler(&state).page_json(page).await
    }

    pub async fn document_json(&self) -> Result<String> {
        let state = self.state.lock().await;
        self.assembler(&state).document_json().await
    }

    /// Serialize the document to a ZIP archive.
    pub async fn export_document(&self) -> Result<Vec<u8>> {
        let mut state = self.state.lock().await;
        self.flush_locked(&mut state).await;
        let assembler = self.assembler(&state);
        Ok(export_document(&state.manifest, &assembler, &self.store.assets).await?)
    }

    /// Replace the document with the archive in `bytes`.
    ///
    /// A rejected archive leaves the document unchanged. On success the
    /// first imported page becomes active.
    pub async fn import_document(&self, bytes: &[u8]) -> Result<ImportReport> {
        let mut state = self.state.lock().await;
        let outcome = import_document(bytes, &self.store).await?;

        let mut manifest = outcome.manifest;
        let content = match outcome.first_page {
            Some(content) => content,
            None => {
                let page = PageRef::new("page-1", "Page 1");
                let patch = ManifestPatch::default()
                    .page_order(vec![page.clone()])
                    .active_page(page.id.clone());
                manifest.apply(patch.clone());
                self.store.manifest.update(patch).await;
                PageContent::empty(&page)
            }
        };

        state.manifest = manifest;
        state.buffer = ActivePage::new(content);
        self.flush_locked(&mut state).await;

        Ok(ImportReport {
            pages: state.manifest.total_pages,
            questions: state.manifest.total_questions,
            warnings: outcome.warnings,
        })
    }

    // -- Flushing --

    /// Write the active page to the page cache now.
    pub async fn flush(&self) {
        let mut state = self.state.lock().await;
        self.flush_locked(&mut state).await;
    }

    /// Flush if the autosave policy says the buffer has waited long enough.
    /// Returns whether a flush happened.
    pub async fn autosave_if_due(&self) -> bool {
        let mut state = self.state.lock().await;
        if !state.tracker.should_flush(&self.autosave) {
            return false;
        }
        self.flush_locked(&mut state).await;
        true
    }

    // -- Internals --

    fn assembler<'a>(&'a self, state: &'a EditorState) -> DocumentAssembler<'a> {
        DocumentAssembler::new(&state.manifest, state.buffer.content(), &self.store.pages)
    }

    /// Apply `patch` locally and send it to the manifest store.
    async fn commit(&self, state: &mut EditorState, patch: ManifestPatch) {
        state.manifest.apply(patch.clone());
        self.store.manifest.update(patch).await;
    }

    async fn flush_locked(&self, state: &mut EditorState) {
        let page = state.buffer.id().clone();
        match self.store.pages.try_put(&page, &state.buffer.to_data()).await {
            Ok(()) => state.tracker.mark_flushed(),
            Err(e) => tracing::error!(page = %page, error = %e, "failed to flush active page"),
        }
    }

    async fn switch_locked(&self, state: &mut EditorState, page: &PageRef) {
        if state.buffer.id() == &page.id {
            return;
        }
        let from = state.buffer.id().clone();
        self.flush_locked(state).await;
        let content = load_page(&self.store, &state.manifest, page).await;
        state.buffer = ActivePage::new(content);
        state.tracker.mark_flushed();
        self.commit(state, ManifestPatch::default().active_page(page.id.clone())).await;
        tracing::debug!(from = %from, to = %page.id, "switched page");
    }

    async fn release_image(&self, image: Option<&AssetRef>) {
        if let Some(handle) = image.and_then(AssetRef::session) {
            self.store.assets.release(handle).await;
        }
    }
}

async fn load_page(store: &QuizStore, manifest: &Manifest, page: &PageRef) -> PageContent {
    let mut content = match store.pages.get(&page.id).await {
        Some(data) => PageContent::from_data(page, data),
        None => PageContent::empty(page),
    };
    content.time_limit = manifest.time_limit.per_page();
    content
}

//! Fully materialized quiz document.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::{Manifest, PageContent, PageId, Question, QuestionId};

/// Manifest plus every page's content, in page order.
///
/// Only built for export, preview, and tests; the editor never holds one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDocument {
    pub manifest: Manifest,
    pub pages: Vec<PageContent>,
}

impl QuizDocument {
    pub fn page(&self, id: &PageId) -> Option<&PageContent> {
        self.pages.iter().find(|page| &page.id == id)
    }

    pub fn question_count(&self) -> usize {
        self.pages.iter().map(|page| page.questions.len()).sum()
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.pages.iter().flat_map(|page| page.questions.iter())
    }

    /// Check document-wide id uniqueness and answer references.
    pub fn validate(&self) -> Result<()> {
        let mut pages: HashSet<&PageId> = HashSet::new();
        for page in &self.manifest.page_order {
            if !pages.insert(&page.id) {
                return Err(ModelError::DuplicatePageId(page.id.clone()));
            }
        }
        let mut questions: HashSet<&QuestionId> = HashSet::new();
        for question in self.questions() {
            if !questions.insert(question.id()) {
                return Err(ModelError::DuplicateQuestionId(question.id().clone()));
            }
        }
        for page in &self.pages {
            for (id, values) in page.answers.iter() {
                let question = page
                    .question(id)
                    .ok_or_else(|| ModelError::UnknownQuestion(id.clone()))?;
                if question.kind().has_options() {
                    for value in values {
                        let option = value.as_str().into();
                        if !question.has_option(&option) {
                            return Err(ModelError::UnknownOption {
                                question: id.clone(),
                                option,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

//! Pages.

use serde::{Deserialize, Serialize};

use crate::reorder::Identified;
use crate::{Answers, PageId, Question, QuestionId};

/// Entry in the manifest's page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub id: PageId,
    pub title: String,
}

impl PageRef {
    pub fn new(id: impl Into<PageId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

impl Identified for PageRef {
    type Id = PageId;

    fn id(&self) -> &PageId {
        &self.id
    }
}

/// The page cache blob: `{questions, answers}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub answers: Answers,
}

/// A page's full content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    pub id: PageId,
    pub title: String,
    /// Mirrors the manifest's per-page limit; not authoritative.
    #[serde(default)]
    pub time_limit: Option<u32>,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub answers: Answers,
}

impl PageContent {
    pub fn empty(page: &PageRef) -> Self {
        Self {
            id: page.id.clone(),
            title: page.title.clone(),
            time_limit: None,
            questions: Vec::new(),
            answers: Answers::new(),
        }
    }

    pub fn from_data(page: &PageRef, data: PageData) -> Self {
        Self {
            id: page.id.clone(),
            title: page.title.clone(),
            time_limit: None,
            questions: data.questions,
            answers: data.answers,
        }
    }

    /// Split off the cacheable part.
    pub fn to_data(&self) -> PageData {
        PageData {
            questions: self.questions.clone(),
            answers: self.answers.clone(),
        }
    }

    pub fn into_data(self) -> PageData {
        PageData {
            questions: self.questions,
            answers: self.answers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty() && self.answers.is_empty()
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    pub fn question_mut(&mut self, id: &QuestionId) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id() == id)
    }

    pub fn question_ids(&self) -> impl Iterator<Item = &QuestionId> {
        self.questions.iter().map(Question::id)
    }

    /// Remove answers that reference missing questions or options.
    pub fn prune_answers(&mut self) -> usize {
        self.answers.prune(&self.questions)
    }
}

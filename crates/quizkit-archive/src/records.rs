//! JSON records stored inside an archive.

use quizkit_model::{Manifest, PageId, PageRef, Question, TimeLimit};
use serde::{Deserialize, Serialize};

/// `quiz/manifest.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveManifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub total_pages: usize,
    #[serde(default)]
    pub total_questions: usize,
    #[serde(default)]
    pub global_time_limit: Option<u32>,
    #[serde(default)]
    pub page_time_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
    #[serde(default)]
    pub page_order: Vec<ArchivePageEntry>,
}

impl ArchiveManifest {
    pub fn time_limit(&self) -> TimeLimit {
        TimeLimit::from_fields(self.global_time_limit, self.page_time_limit)
    }

    /// The store manifest this archive describes. Totals are recomputed by
    /// the importer.
    pub fn to_manifest(&self) -> Manifest {
        Manifest {
            name: self.name.clone(),
            description: self.description.clone(),
            total_pages: self.page_order.len(),
            total_questions: self.total_questions,
            active_page: self.page_order.first().map(|entry| entry.id.clone()),
            time_limit: self.time_limit(),
            page_order: self.page_order.iter().map(ArchivePageEntry::page_ref).collect(),
        }
    }
}

/// One `pageOrder` entry of the archive manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivePageEntry {
    pub id: PageId,
    #[serde(default)]
    pub title: String,
    /// Relative to `quiz/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
    /// Relative to `quiz/`. Older archives have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers_file: Option<String>,
}

impl ArchivePageEntry {
    pub fn page_ref(&self) -> PageRef {
        PageRef::new(self.id.clone(), self.title.clone())
    }
}

/// `page_config.json`: one page's questions with archive-relative images.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    #[serde(default)]
    pub id: Option<PageId>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

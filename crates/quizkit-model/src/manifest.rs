//! Document manifest: metadata and page order.

use serde::{Deserialize, Serialize};

use crate::{PageId, PageRef};

/// Quiz time limit, in minutes.
///
/// The global and per-page limits are mutually exclusive, so they are one
/// value here and two nullable fields on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeLimit {
    #[default]
    None,
    /// One limit for the whole quiz.
    Global(u32),
    /// The same limit applied to every page.
    PerPage(u32),
}

impl TimeLimit {
    /// Build from the two wire fields. A record carrying both is resolved in
    /// favour of the global limit.
    pub fn from_fields(global: Option<u32>, per_page: Option<u32>) -> Self {
        match (global, per_page) {
            (Some(minutes), _) => Self::Global(minutes),
            (None, Some(minutes)) => Self::PerPage(minutes),
            (None, None) => Self::None,
        }
    }

    pub fn global(&self) -> Option<u32> {
        match self {
            Self::Global(minutes) => Some(*minutes),
            _ => None,
        }
    }

    pub fn per_page(&self) -> Option<u32> {
        match self {
            Self::PerPage(minutes) => Some(*minutes),
            _ => None,
        }
    }
}

/// Document-level record, always fully resident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ManifestRecord", into = "ManifestRecord")]
pub struct Manifest {
    pub name: String,
    pub description: String,
    pub total_pages: usize,
    pub total_questions: usize,
    pub active_page: Option<PageId>,
    pub time_limit: TimeLimit,
    pub page_order: Vec<PageRef>,
}

impl Manifest {
    pub fn page(&self, id: &PageId) -> Option<&PageRef> {
        self.page_order.iter().find(|page| &page.id == id)
    }

    pub fn page_index(&self, id: &PageId) -> Option<usize> {
        self.page_order.iter().position(|page| &page.id == id)
    }

    pub fn contains_page(&self, id: &PageId) -> bool {
        self.page_index(id).is_some()
    }

    /// Merge a partial update.
    pub fn apply(&mut self, patch: ManifestPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(time_limit) = patch.time_limit {
            self.time_limit = time_limit;
        }
        if let Some(active_page) = patch.active_page {
            self.active_page = Some(active_page);
        }
        if let Some(page_order) = patch.page_order {
            self.total_pages = page_order.len();
            self.page_order = page_order;
        }
        if let Some(total_pages) = patch.total_pages {
            self.total_pages = total_pages;
        }
        if let Some(total_questions) = patch.total_questions {
            self.total_questions = total_questions;
        }
    }
}

/// Partial manifest update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub total_pages: Option<usize>,
    pub total_questions: Option<usize>,
    pub active_page: Option<PageId>,
    pub time_limit: Option<TimeLimit>,
    pub page_order: Option<Vec<PageRef>>,
}

impl ManifestPatch {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn time_limit(mut self, time_limit: TimeLimit) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    #[must_use]
    pub fn active_page(mut self, page: PageId) -> Self {
        self.active_page = Some(page);
        self
    }

    #[must_use]
    pub fn page_order(mut self, page_order: Vec<PageRef>) -> Self {
        self.page_order = Some(page_order);
        self
    }

    #[must_use]
    pub fn total_questions(mut self, total: usize) -> Self {
        self.total_questions = Some(total);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ManifestRecord {
    name: String,
    description: String,
    total_pages: usize,
    total_questions: usize,
    active_page: String,
    global_time_limit: Option<u32>,
    page_time_limit: Option<u32>,
    page_order: Vec<PageRef>,
}

impl From<ManifestRecord> for Manifest {
    fn from(record: ManifestRecord) -> Self {
        Self {
            name: record.name,
            description: record.description,
            total_pages: record.total_pages,
            total_questions: record.total_questions,
            active_page: (!record.active_page.is_empty()).then(|| PageId::new(record.active_page)),
            time_limit: TimeLimit::from_fields(record.global_time_limit, record.page_time_limit),
            page_order: record.page_order,
        }
    }
}

impl From<Manifest> for ManifestRecord {
    fn from(manifest: Manifest) -> Self {
        Self {
            name: manifest.name,
            description: manifest.description,
            total_pages: manifest.total_pages,
            total_questions: manifest.total_questions,
            active_page: manifest
                .active_page
                .map(PageId::into_inner)
                .unwrap_or_default(),
            global_time_limit: manifest.time_limit.global(),
            page_time_limit: manifest.time_limit.per_page(),
            page_order: manifest.page_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_limits_are_exclusive() {
        let mut manifest = Manifest::default();
        manifest.apply(ManifestPatch::default().time_limit(TimeLimit::PerPage(5)));
        assert_eq!(manifest.time_limit.per_page(), Some(5));

        manifest.apply(ManifestPatch::default().time_limit(TimeLimit::Global(30)));
        assert_eq!(manifest.time_limit.global(), Some(30));
        assert_eq!(manifest.time_limit.per_page(), None);
    }

    #[test]
    fn test_record_with_both_limits_keeps_global() {
        let json = r#"{"name":"Q","globalTimeLimit":10,"pageTimeLimit":3}"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.time_limit, TimeLimit::Global(10));
    }

    #[test]
    fn test_wire_shape() {
        let manifest = Manifest {
            name: "Geography".into(),
            active_page: Some("page-1".into()),
            time_limit: TimeLimit::PerPage(2),
            page_order: vec![PageRef::new("page-1", "Page 1")],
            total_pages: 1,
            ..Manifest::default()
        };
        let value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(value["activePage"], "page-1");
        assert!(value["globalTimeLimit"].is_null());
        assert_eq!(value["pageTimeLimit"], 2);
        assert_eq!(value["pageOrder"][0]["title"], "Page 1");
        assert_eq!(value["totalPages"], 1);

        let back: Manifest = serde_json::from_value(value).unwrap();
        assert_eq!(back, manifest);
    }

    #[test]
    fn test_page_order_patch_updates_total() {
        let mut manifest = Manifest::default();
        manifest.apply(ManifestPatch::default().page_order(vec![
            PageRef::new("a", "A"),
            PageRef::new("b", "B"),
        ]));
        assert_eq!(manifest.total_pages, 2);
        assert_eq!(manifest.page_index(&"b".into()), Some(1));
    }
}

//! Archive import.
//!
//! Import runs in two passes so that a rejected archive leaves the
//! workspace untouched:
//!
//! 1. Read the manifest and check page and question id uniqueness, one page
//!    config at a time. Only ids and per-page file locations are kept.
//! 2. Replace the workspace: clear session assets, then re-read each page,
//!    load its images into fresh handles, and cache it before moving to the
//!    next. Only the first page stays in memory. Cached pages that are not
//!    in the archive are dropped and the new manifest is persisted.

use std::collections::HashSet;
use std::io::{Cursor, Read, Seek};

use quizkit_model::{
    Answers, AssetHandle, AssetRef, Manifest, PageContent, PageData, PageId, PageRef, QuestionId,
};
use quizkit_store::{QuizStore, SessionAssets};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{ArchiveError, ImportWarning, Result};
use crate::layout::{self, ANSWERS_FILE, PAGE_CONFIG_FILE, SegmentAllocator};
use crate::records::{ArchiveManifest, PageConfig};

/// Result of a successful import.
#[derive(Debug)]
pub struct ImportOutcome {
    /// The new manifest, already persisted.
    pub manifest: Manifest,
    /// Content of the first page, for the active buffer. `None` when the
    /// archive has no pages.
    pub first_page: Option<PageContent>,
    /// Problems recovered from along the way.
    pub warnings: Vec<ImportWarning>,
}

/// Where pass 2 finds a page validated in pass 1.
struct PagePlan {
    page: PageRef,
    /// Directory of the page config, relative to `quiz/`.
    config_dir: String,
    /// `None` when the config was unreadable and the page imports empty.
    config_file: Option<String>,
    /// `None` when the answers record was unreadable.
    answers_file: Option<String>,
}

/// Replace the workspace in `store` with the archive in `bytes`.
///
/// Ids are taken as-is. On error nothing in `store` has been modified.
pub async fn import_document(bytes: &[u8], store: &QuizStore) -> Result<ImportOutcome> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let Some(manifest_bytes) = read_entry(&mut archive, &layout::manifest_path())? else {
        return Err(ArchiveError::MissingManifest);
    };
    let record: ArchiveManifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|source| ArchiveError::InvalidManifest { source })?;

    let mut warnings = Vec::new();
    let (plans, total_questions) = plan_pages(&mut archive, &record, &mut warnings)?;

    // Pass 2: the archive is accepted, replace the workspace.
    store.assets.clear().await;

    let time_limit = record.time_limit();
    let mut manifest = record.to_manifest();
    manifest.total_questions = total_questions;

    let keep: HashSet<PageId> = plans.iter().map(|plan| plan.page.id.clone()).collect();
    let mut first_page = None;
    for (index, plan) in plans.into_iter().enumerate() {
        let mut data = read_page_data(&mut archive, &plan, &mut warnings);

        for question in &mut data.questions {
            let Some(image) = question.image().cloned() else {
                continue;
            };
            let resolved = match &image {
                AssetRef::Archived(path) => {
                    load_image(&mut archive, &store.assets, &plan.config_dir, path).await
                }
                AssetRef::Session(_) => Err("session handles are not portable".to_string()),
            };
            match resolved {
                Ok(handle) => {
                    question.set_image(Some(AssetRef::Session(handle)));
                }
                Err(reason) => {
                    tracing::warn!(question = %question.id(), image = %image, %reason, "image not imported");
                    warnings.push(ImportWarning::AssetUnresolved {
                        question: question.id().clone(),
                        path: image.to_string(),
                        reason,
                    });
                    question.set_image(None);
                }
            }
        }

        let mut content = PageContent::from_data(&plan.page, data);
        content.time_limit = time_limit.per_page();
        let pruned = content.prune_answers();
        if pruned > 0 {
            tracing::debug!(page = %plan.page.id, pruned, "pruned dangling answers");
        }

        if index == 0 {
            first_page = Some(content);
        } else {
            store.pages.put(&content.id, &content.to_data()).await;
        }
    }

    for cached in store.pages.page_ids().await {
        if !keep.contains(&cached) {
            store.pages.delete(&cached).await;
        }
    }

    let manifest = store.manifest.replace(manifest).await;

    tracing::info!(
        name = %manifest.name,
        pages = manifest.total_pages,
        questions = manifest.total_questions,
        warnings = warnings.len(),
        "imported quiz archive"
    );

    Ok(ImportOutcome {
        manifest,
        first_page,
        warnings,
    })
}

/// Pass 1: validate id uniqueness and locate every page's records.
///
/// Each config is parsed and dropped before the next one is read. Returns
/// the plans and the total question count.
fn plan_pages<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    record: &ArchiveManifest,
    warnings: &mut Vec<ImportWarning>,
) -> Result<(Vec<PagePlan>, usize)> {
    let mut page_ids: HashSet<&PageId> = HashSet::new();
    let mut question_ids: HashSet<QuestionId> = HashSet::new();
    let mut default_dirs = SegmentAllocator::default();
    let mut plans = Vec::with_capacity(record.page_order.len());

    for entry in &record.page_order {
        if !page_ids.insert(&entry.id) {
            return Err(ArchiveError::duplicate_page(&entry.id));
        }

        let default_dir = format!("page_{}", default_dirs.allocate(entry.id.as_str()));
        let config_file = entry
            .config_file
            .clone()
            .unwrap_or_else(|| format!("{default_dir}/{PAGE_CONFIG_FILE}"));
        let config_dir = layout::parent_dir(&config_file).to_string();
        let mut plan = PagePlan {
            page: entry.page_ref(),
            config_dir,
            config_file: None,
            answers_file: None,
        };

        match read_page_config(archive, &config_file) {
            Ok(config) => {
                for question in &config.questions {
                    if !question_ids.insert(question.id().clone()) {
                        return Err(ArchiveError::duplicate_question(question.id()));
                    }
                }
                plan.config_file = Some(config_file);
            }
            Err(reason) => {
                tracing::warn!(page = %entry.id, file = %config_file, %reason, "page config skipped");
                warnings.push(ImportWarning::PageSkipped {
                    page: entry.id.clone(),
                    reason,
                });
                plans.push(plan);
                continue;
            }
        }

        let answers_file = entry
            .answers_file
            .clone()
            .unwrap_or_else(|| join(&plan.config_dir, ANSWERS_FILE));
        match read_answers(archive, &answers_file) {
            Ok(_) => plan.answers_file = Some(answers_file),
            Err(reason) => {
                tracing::warn!(page = %entry.id, file = %answers_file, %reason, "answers ignored");
                warnings.push(ImportWarning::AnswersIgnored {
                    page: entry.id.clone(),
                    reason,
                });
            }
        }

        plans.push(plan);
    }

    Ok((plans, question_ids.len()))
}

/// Pass 2 read of one page from the files pass 1 accepted.
fn read_page_data<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    plan: &PagePlan,
    warnings: &mut Vec<ImportWarning>,
) -> PageData {
    let mut data = PageData::default();
    let Some(config_file) = &plan.config_file else {
        return data;
    };
    match read_page_config(archive, config_file) {
        Ok(config) => data.questions = config.questions,
        Err(reason) => {
            warnings.push(ImportWarning::PageSkipped {
                page: plan.page.id.clone(),
                reason,
            });
            return data;
        }
    }
    if let Some(answers_file) = &plan.answers_file {
        match read_answers(archive, answers_file) {
            Ok(answers) => data.answers = answers,
            Err(reason) => warnings.push(ImportWarning::AnswersIgnored {
                page: plan.page.id.clone(),
                reason,
            }),
        }
    }
    data
}

fn join(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    }
}

fn read_page_config<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    config_file: &str,
) -> std::result::Result<PageConfig, String> {
    let path = layout::resolve("", config_file)
        .ok_or_else(|| format!("config path '{config_file}' leaves the archive"))?;
    let bytes = read_entry(archive, &path)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("{path} not found"))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("{path}: {e}"))
}

/// Absent answers are an empty record, not an error.
fn read_answers<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    answers_file: &str,
) -> std::result::Result<Answers, String> {
    let path = layout::resolve("", answers_file)
        .ok_or_else(|| format!("answers path '{answers_file}' leaves the archive"))?;
    match read_entry(archive, &path).map_err(|e| e.to_string())? {
        Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| format!("{path}: {e}")),
        None => Ok(Answers::new()),
    }
}

async fn load_image<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    assets: &SessionAssets,
    config_dir: &str,
    image: &str,
) -> std::result::Result<AssetHandle, String> {
    let path = layout::resolve(config_dir, image)
        .ok_or_else(|| "path leaves the page directory".to_string())?;
    let bytes = read_entry(archive, &path)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("{path} not found"))?;
    assets.register(bytes).await.map_err(|e| e.user_message())
}

/// Read a whole entry, `None` if the archive has no such file.
fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Option<Vec<u8>>> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}

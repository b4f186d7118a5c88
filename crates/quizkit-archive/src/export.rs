//! Archive export.

use std::future::Future;
use std::io::{Cursor, Write};

use quizkit_model::{AssetRef, Manifest, PageContent, PageRef};
use quizkit_store::SessionAssets;
use serde::Serialize;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{ArchiveError, Result};
use crate::image::sniff_extension;
use crate::layout::{
    ANSWERS_FILE, ASSETS_DIR, MANIFEST_FILE, PAGE_CONFIG_FILE, ROOT_DIR, SegmentAllocator,
};
use crate::records::{ArchiveManifest, ArchivePageEntry, PageConfig};

/// Source of page content during export.
///
/// Pages are requested one at a time in manifest order, so an implementor
/// only ever needs one page resident.
pub trait PageProvider {
    fn page(&self, page: &PageRef) -> impl Future<Output = PageContent> + Send;
}

/// In-memory ZIP writer rooted at `quiz/`.
pub struct ArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated),
        }
    }

    /// Write raw bytes at `path` (relative to `quiz/`).
    pub fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        self.zip.start_file(format!("{ROOT_DIR}/{path}"), self.options)?;
        self.zip.write_all(bytes)?;
        Ok(())
    }

    /// Write `value` as pretty-printed JSON at `path`.
    pub fn write_json<T: Serialize>(&mut self, path: &str, value: &T) -> Result<()> {
        let bytes =
            serde_json::to_vec_pretty(value).map_err(|source| ArchiveError::Serialization {
                file: path.to_string(),
                source,
            })?;
        self.write_file(path, &bytes)
    }

    /// Finish the container and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        Ok(self.zip.finish()?.into_inner())
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize the document described by `manifest` into a ZIP archive.
///
/// Session image handles are resolved through `assets` and written next to
/// the page config; a handle that cannot be fetched drops the image with a
/// warning. Answers are restricted to each page's own questions.
pub async fn export_document<P>(
    manifest: &Manifest,
    provider: &P,
    assets: &SessionAssets,
) -> Result<Vec<u8>>
where
    P: PageProvider + Sync,
{
    let mut writer = ArchiveWriter::new();
    let mut page_dirs = SegmentAllocator::default();
    let mut entries = Vec::with_capacity(manifest.page_order.len());
    let mut total_questions = 0;

    for page in &manifest.page_order {
        let mut content = provider.page(page).await;
        let dir = format!("page_{}", page_dirs.allocate(page.id.as_str()));

        let mut asset_names = SegmentAllocator::default();
        for question in &mut content.questions {
            let Some(image) = question.image().cloned() else {
                continue;
            };
            let bytes = match &image {
                AssetRef::Session(handle) => assets.fetch(*handle).await,
                AssetRef::Archived(_) => None,
            };
            let Some(bytes) = bytes else {
                tracing::warn!(question = %question.id(), image = %image, "image unavailable, exporting without it");
                question.set_image(None);
                continue;
            };
            let file_name = format!(
                "{}.{}",
                asset_names.allocate(question.id().as_str()),
                sniff_extension(&bytes)
            );
            writer.write_file(&format!("{dir}/{ASSETS_DIR}/{file_name}"), &bytes)?;
            question.set_image(Some(AssetRef::Archived(format!("{ASSETS_DIR}/{file_name}"))));
        }

        total_questions += content.questions.len();
        let answers = content.answers.restricted_to(content.question_ids());
        let config = PageConfig {
            id: Some(page.id.clone()),
            title: page.title.clone(),
            time_limit: manifest.time_limit.per_page(),
            questions: content.questions,
        };

        let config_file = format!("{dir}/{PAGE_CONFIG_FILE}");
        let answers_file = format!("{dir}/{ANSWERS_FILE}");
        writer.write_json(&config_file, &config)?;
        writer.write_json(&answers_file, &answers)?;

        entries.push(ArchivePageEntry {
            id: page.id.clone(),
            title: page.title.clone(),
            config_file: Some(config_file),
            answers_file: Some(answers_file),
        });
    }

    let record = ArchiveManifest {
        name: manifest.name.clone(),
        description: manifest.description.clone(),
        total_pages: entries.len(),
        total_questions,
        global_time_limit: manifest.time_limit.global(),
        page_time_limit: manifest.time_limit.per_page(),
        exported_at: Some(chrono::Utc::now().to_rfc3339()),
        page_order: entries,
    };
    writer.write_json(MANIFEST_FILE, &record)?;

    let bytes = writer.finish()?;
    tracing::info!(
        pages = record.total_pages,
        questions = record.total_questions,
        bytes = bytes.len(),
        "exported quiz archive"
    );
    Ok(bytes)
}

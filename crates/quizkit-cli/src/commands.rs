//! Command execution.
//!
//! Every command opens the workspace, runs through [`Editor`], flushes the
//! active page, and returns the text to print.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use quizkit_archive::{ImportWarning, suggested_file_name};
use quizkit_editor::Editor;
use quizkit_model::{Manifest, OptionId, PageContent, PageId, QuestionId, TimeLimit};
use quizkit_store::QuizStore;

use crate::cli::{Command, OptionCommand, PageCommand, QuestionCommand, TimeLimitArgs};
use crate::settings::Settings;

/// Run `command` against the workspace at `workspace`.
pub async fn run(command: Command, workspace: &Path, settings: &Settings) -> Result<String> {
    let store = QuizStore::open_dir(workspace)
        .with_context(|| format!("open workspace {}", workspace.display()))?;
    let editor = Editor::open(store, settings.editor.autosave.clone()).await;
    tracing::debug!(workspace = %workspace.display(), "workspace opened");

    let output = execute(&editor, command, settings).await;
    editor.flush().await;
    output
}

async fn execute(editor: &Editor, command: Command, settings: &Settings) -> Result<String> {
    match command {
        Command::Info => info(editor).await,
        Command::Name { name } => {
            editor.set_name(name.as_str()).await;
            Ok(format!("Name set to '{name}'"))
        }
        Command::Description { text } => {
            editor.set_description(text).await;
            Ok("Description updated".to_string())
        }
        Command::TimeLimit(args) => {
            let limit = time_limit(&args);
            editor.set_time_limit(limit).await;
            Ok(format!("Time limit: {}", describe_time_limit(limit)))
        }
        Command::Page(page) => run_page(editor, page).await,
        Command::Question(question) => run_question(editor, question, settings).await,
        Command::Option(option) => run_option(editor, option).await,
        Command::Answer { question, value } => {
            let question = QuestionId::from(question.as_str());
            let selected = editor.set_answer(&question, &value).await?;
            Ok(if selected {
                format!("Answer for {question}: '{value}' selected")
            } else {
                format!("Answer for {question}: '{value}' cleared")
            })
        }
        Command::Preview { page } => match page {
            Some(id) => Ok(editor.page_json(&PageId::from(id.as_str())).await?),
            None => Ok(editor.document_json().await?),
        },
        Command::Export { path } => export(editor, path, settings).await,
        Command::Import { path } => import(editor, &path).await,
    }
}

async fn run_page(editor: &Editor, command: PageCommand) -> Result<String> {
    match command {
        PageCommand::List => {
            let manifest = editor.manifest().await;
            let document = editor.document().await;
            Ok(page_table(&manifest, &document.pages).to_string())
        }
        PageCommand::Add { title } => {
            let page = editor.add_page(title).await;
            Ok(format!("Added page {} ({})", page.id, page.title))
        }
        PageCommand::Delete { id } => {
            editor.delete_page(&PageId::from(id.as_str())).await?;
            let manifest = editor.manifest().await;
            let current = manifest
                .active_page
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            Ok(format!("Deleted page {id}; current page is {current}"))
        }
        PageCommand::Rename { id, title } => {
            editor
                .rename_page(&PageId::from(id.as_str()), title.as_str())
                .await?;
            Ok(format!("Renamed page {id} to '{title}'"))
        }
        PageCommand::Switch { id } => {
            editor.switch_page(&PageId::from(id.as_str())).await?;
            Ok(format!("Current page is {id}"))
        }
        PageCommand::Move { source, target } => {
            let moved = editor
                .reorder_pages(&PageId::from(source.as_str()), &PageId::from(target.as_str()))
                .await;
            if !moved {
                bail!("cannot move page {source} to {target}: unknown or identical ids");
            }
            Ok(format!("Moved page {source} to the position of {target}"))
        }
    }
}

async fn run_question(
    editor: &Editor,
    command: QuestionCommand,
    settings: &Settings,
) -> Result<String> {
    match command {
        QuestionCommand::List => Ok(question_table(&editor.active_page().await).to_string()),
        QuestionCommand::Add { kind, text } => {
            let kind = kind.unwrap_or(settings.editor.default_question_type);
            let id = editor.add_question(kind, text).await;
            Ok(format!("Added {kind} question {id}"))
        }
        QuestionCommand::Text { id, text } => {
            editor
                .update_question(&QuestionId::from(id.as_str()), text)
                .await?;
            Ok(format!("Updated question {id}"))
        }
        QuestionCommand::Type { id, kind } => {
            editor
                .change_question_type(&QuestionId::from(id.as_str()), kind)
                .await?;
            Ok(format!("Question {id} is now {kind}"))
        }
        QuestionCommand::Delete { id } => {
            editor
                .delete_question(&QuestionId::from(id.as_str()))
                .await?;
            Ok(format!("Deleted question {id}"))
        }
        QuestionCommand::Move {
            source,
            target,
            to_page,
        } => {
            let source = QuestionId::from(source.as_str());
            if let Some(page) = to_page {
                editor.move_question_to_page(&source, &PageId::from(page.as_str()))?;
                return Ok(format!("Moved question {source} to page {page}"));
            }
            let Some(target) = target else {
                bail!("a target question or --to-page is required");
            };
            if !editor
                .reorder_questions(&source, &QuestionId::from(target.as_str()))
                .await
            {
                bail!("cannot move question {source} to {target}: unknown or identical ids");
            }
            Ok(format!("Moved question {source} to the position of {target}"))
        }
        QuestionCommand::Image { id, file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("read image {}", file.display()))?;
            let handle = editor
                .set_question_image(&QuestionId::from(id.as_str()), bytes)
                .await?;
            Ok(format!("Attached {} to question {id} as {handle}", file.display()))
        }
        QuestionCommand::ClearImage { id } => {
            editor
                .clear_question_image(&QuestionId::from(id.as_str()))
                .await?;
            Ok(format!("Removed image from question {id}"))
        }
    }
}

async fn run_option(editor: &Editor, command: OptionCommand) -> Result<String> {
    match command {
        OptionCommand::Add { question, text } => {
            let id = editor
                .add_option(&QuestionId::from(question.as_str()), text)
                .await?;
            Ok(format!("Added option {id} to question {question}"))
        }
        OptionCommand::Text {
            question,
            option,
            text,
        } => {
            editor
                .update_option(
                    &QuestionId::from(question.as_str()),
                    &OptionId::from(option.as_str()),
                    text,
                )
                .await?;
            Ok(format!("Updated option {option}"))
        }
        OptionCommand::Delete { question, option } => {
            editor
                .delete_option(
                    &QuestionId::from(question.as_str()),
                    &OptionId::from(option.as_str()),
                )
                .await?;
            Ok(format!("Deleted option {option}"))
        }
        OptionCommand::Move {
            question,
            source,
            target,
        } => {
            let moved = editor
                .reorder_options(
                    &QuestionId::from(question.as_str()),
                    &OptionId::from(source.as_str()),
                    &OptionId::from(target.as_str()),
                )
                .await?;
            if !moved {
                bail!("cannot move option {source} to {target}: unknown or identical ids");
            }
            Ok(format!("Moved option {source} to the position of {target}"))
        }
    }
}

async fn info(editor: &Editor) -> Result<String> {
    let manifest = editor.manifest().await;
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.add_row(vec![header_cell("Name"), Cell::new(&manifest.name)]);
    table.add_row(vec![
        header_cell("Description"),
        Cell::new(&manifest.description),
    ]);
    table.add_row(vec![
        header_cell("Pages"),
        Cell::new(manifest.total_pages),
    ]);
    table.add_row(vec![
        header_cell("Questions"),
        Cell::new(manifest.total_questions),
    ]);
    table.add_row(vec![
        header_cell("Time limit"),
        Cell::new(describe_time_limit(manifest.time_limit)),
    ]);
    let current = manifest
        .active_page
        .as_ref()
        .and_then(|id| manifest.page(id))
        .map(|page| format!("{} ({})", page.title, page.id))
        .unwrap_or_default();
    table.add_row(vec![header_cell("Current page"), Cell::new(current)]);
    Ok(table.to_string())
}

async fn export(editor: &Editor, path: Option<PathBuf>, settings: &Settings) -> Result<String> {
    let manifest = editor.manifest().await;
    let path = path.unwrap_or_else(|| {
        settings
            .export
            .directory
            .clone()
            .unwrap_or_default()
            .join(suggested_file_name(&manifest.name))
    });

    let bytes = editor.export_document().await?;
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("write archive {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "archive written");
    Ok(format!(
        "Exported {} pages and {} questions to {}",
        manifest.total_pages,
        manifest.total_questions,
        path.display()
    ))
}

async fn import(editor: &Editor, path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("read archive {}", path.display()))?;
    let report = editor.import_document(&bytes).await?;

    let mut output = format!(
        "Imported {} pages and {} questions from {}",
        report.pages,
        report.questions,
        path.display()
    );
    for warning in &report.warnings {
        let _ = write!(output, "\nwarning: {}", describe_warning(warning));
    }
    Ok(output)
}

fn time_limit(args: &TimeLimitArgs) -> TimeLimit {
    match (args.global, args.per_page) {
        (Some(minutes), _) => TimeLimit::Global(minutes),
        (None, Some(minutes)) => TimeLimit::PerPage(minutes),
        (None, None) => TimeLimit::None,
    }
}

fn describe_time_limit(limit: TimeLimit) -> String {
    match limit {
        TimeLimit::None => "none".to_string(),
        TimeLimit::Global(minutes) => format!("{minutes} min for the quiz"),
        TimeLimit::PerPage(minutes) => format!("{minutes} min per page"),
    }
}

fn describe_warning(warning: &ImportWarning) -> String {
    match warning {
        ImportWarning::PageSkipped { page, reason } => {
            format!("page {page} imported empty: {reason}")
        }
        ImportWarning::AnswersIgnored { page, reason } => {
            format!("answers of page {page} ignored: {reason}")
        }
        ImportWarning::AssetUnresolved {
            question,
            path,
            reason,
        } => format!("image {path} of question {question} dropped: {reason}"),
    }
}

fn page_table(manifest: &Manifest, pages: &[PageContent]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("ID"),
        header_cell("Title"),
        header_cell("Questions"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for (index, page) in pages.iter().enumerate() {
        let current = manifest.active_page.as_ref() == Some(&page.id);
        let id = if current {
            Cell::new(format!("* {}", page.id)).add_attribute(Attribute::Bold)
        } else {
            Cell::new(format!("  {}", page.id))
        };
        table.add_row(vec![
            Cell::new(index + 1),
            id,
            Cell::new(&page.title),
            Cell::new(page.questions.len()),
        ]);
    }
    table
}

fn question_table(page: &PageContent) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Type"),
        header_cell("Text"),
        header_cell("Options"),
        header_cell("Answer"),
    ]);
    apply_table_style(&mut table);
    for question in &page.questions {
        let options = question
            .options()
            .iter()
            .map(|option| format!("{}: {}", option.id, option.text))
            .collect::<Vec<_>>()
            .join("\n");
        let answer = page
            .answers
            .get(question.id())
            .map(|values| values.join(", "))
            .unwrap_or_default();
        let mut text = question.text().to_string();
        if let Some(image) = question.image() {
            let _ = write!(text, "\n[image {image}]");
        }
        table.add_row(vec![
            Cell::new(question.id()),
            Cell::new(question.kind()),
            Cell::new(text),
            Cell::new(options),
            Cell::new(answer).fg(Color::Green),
        ]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

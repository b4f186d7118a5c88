//! Commands run against directory workspaces, one process-like call at a time.

use std::path::Path;

use clap::Parser;
use quizkit_cli::cli::Cli;
use quizkit_cli::commands;
use quizkit_cli::settings::Settings;
use quizkit_editor::EditorError;

async fn quizkit(workspace: &Path, args: &[&str]) -> anyhow::Result<String> {
    let mut argv = vec![
        "quizkit".to_string(),
        "--workspace".to_string(),
        workspace.display().to_string(),
    ];
    argv.extend(args.iter().map(ToString::to_string));
    let cli = Cli::try_parse_from(argv).unwrap();
    commands::run(cli.command, workspace, &Settings::default()).await
}

fn last_word(output: &str) -> String {
    output.split_whitespace().last().unwrap().to_string()
}

#[tokio::test]
async fn edits_persist_between_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let ws = dir.path();

    quizkit(ws, &["name", "Capitals"]).await.unwrap();
    let added = quizkit(ws, &["question", "add", "--type", "fill", "Capital of France?"])
        .await
        .unwrap();
    assert!(added.contains("fill-in-the-blank"));
    let question = last_word(&added);

    let answered = quizkit(ws, &["answer", &question, "Paris"]).await.unwrap();
    assert!(answered.ends_with("selected"));

    let page = quizkit(ws, &["page", "add", "Asia"]).await.unwrap();
    assert!(page.starts_with("Added page"));

    let list = quizkit(ws, &["page", "list"]).await.unwrap();
    assert!(list.contains("page-1"));
    assert!(list.contains("Asia"));

    let info = quizkit(ws, &["info"]).await.unwrap();
    assert!(info.contains("Capitals"));
    assert!(info.contains("Asia"));

    quizkit(ws, &["page", "switch", "page-1"]).await.unwrap();
    let questions = quizkit(ws, &["question", "list"]).await.unwrap();
    assert!(questions.contains("Capital of France?"));
    assert!(questions.contains("Paris"));
}

#[tokio::test]
async fn export_and_import_between_workspaces() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source");
    let target = dir.path().join("target");
    let archive = dir.path().join("capitals.zip");
    let image = dir.path().join("flag.png");
    std::fs::write(&image, b"\x89PNG\r\n\x1a\nflag").unwrap();

    quizkit(&source, &["name", "Capitals"]).await.unwrap();
    let question = last_word(
        &quizkit(&source, &["question", "add", "Which flag?"])
            .await
            .unwrap(),
    );
    quizkit(&source, &["question", "image", &question, image.to_str().unwrap()])
        .await
        .unwrap();
    quizkit(&source, &["time-limit", "--per-page", "3"])
        .await
        .unwrap();

    let exported = quizkit(&source, &["export", archive.to_str().unwrap()])
        .await
        .unwrap();
    assert!(exported.starts_with("Exported 1 pages and 1 questions"));
    assert!(archive.exists());

    let imported = quizkit(&target, &["import", archive.to_str().unwrap()])
        .await
        .unwrap();
    assert!(imported.starts_with("Imported 1 pages and 1 questions"));
    assert!(!imported.contains("warning"));

    let preview: serde_json::Value =
        serde_json::from_str(&quizkit(&target, &["preview"]).await.unwrap()).unwrap();
    assert_eq!(preview["name"], "Capitals");
    assert_eq!(preview["pageTimeLimit"], 3);
    assert_eq!(preview["pages"][0]["questions"][0]["id"], question.as_str());
    assert_eq!(
        preview["pages"][0]["questions"][0]["image"],
        quizkit_editor::IMAGE_PLACEHOLDER
    );
}

#[tokio::test]
async fn editor_errors_surface_through_anyhow() {
    let dir = tempfile::tempdir().unwrap();
    let ws = dir.path();

    let err = quizkit(ws, &["page", "switch", "nowhere"]).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EditorError>(),
        Some(EditorError::UnknownPage(_))
    ));

    let question = last_word(&quizkit(ws, &["question", "add"]).await.unwrap());
    quizkit(ws, &["page", "add"]).await.unwrap();
    let err = quizkit(ws, &["question", "move", &question, "--to-page", "page-1"])
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EditorError>(),
        Some(EditorError::CrossPageMove { .. })
    ));

    let err = quizkit(ws, &["page", "move", "page-1", "page-1"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cannot move page"));
}

#[test]
fn time_limit_flags_are_exclusive() {
    assert!(
        Cli::try_parse_from(["quizkit", "time-limit", "--global", "5", "--per-page", "3"])
            .is_err()
    );
    assert!(Cli::try_parse_from(["quizkit", "time-limit"]).is_ok());
    assert!(Cli::try_parse_from(["quizkit", "question", "add", "--type", "essay"]).is_err());
    assert!(Cli::try_parse_from(["quizkit", "question", "move", "q1"]).is_err());
}

//! Editing sessions against an in-memory or directory store.

use quizkit_editor::{AutoSaveConfig, Editor, EditorError};
use quizkit_model::{AssetRef, PageId, QuestionType, TimeLimit};
use quizkit_store::QuizStore;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nflag";

async fn editor() -> Editor {
    Editor::open(QuizStore::in_memory(), AutoSaveConfig::disabled()).await
}

#[tokio::test]
async fn empty_workspace_gets_a_first_page() {
    let editor = editor().await;
    let manifest = editor.manifest().await;

    assert_eq!(manifest.total_pages, 1);
    assert_eq!(manifest.page_order[0].id.as_str(), "page-1");
    assert_eq!(manifest.page_order[0].title, "Page 1");
    assert_eq!(manifest.active_page, Some(PageId::from("page-1")));
    assert_eq!(editor.active_page().await.id.as_str(), "page-1");

    // The default page was persisted
    let stored = editor.store().manifest.load().await;
    assert_eq!(stored.page_order, manifest.page_order);
}

#[tokio::test]
async fn switching_pages_keeps_unflushed_edits() {
    let editor = editor().await;
    let first = editor.active_page().await.id;
    let q = editor.add_question(QuestionType::FillInBlank, None).await;
    editor.set_answer(&q, "Paris").await.unwrap();
    assert!(editor.is_dirty().await);

    let second = editor.add_page(None).await;
    assert_eq!(second.title, "Page 2");
    assert_eq!(editor.active_page().await.id, second.id);
    assert!(editor.active_page().await.is_empty());
    assert!(!editor.is_dirty().await);

    editor.switch_page(&first).await.unwrap();
    let page = editor.active_page().await;
    assert_eq!(page.questions[0].text(), "Question 1");
    assert_eq!(page.answers.get(&q), Some(&["Paris".to_string()][..]));
    assert_eq!(editor.manifest().await.active_page, Some(first));
}

#[tokio::test]
async fn switching_to_an_unknown_page_fails() {
    let editor = editor().await;
    let err = editor.switch_page(&"nowhere".into()).await.unwrap_err();
    assert!(matches!(err, EditorError::UnknownPage(_)));
    assert_eq!(editor.active_page().await.id.as_str(), "page-1");
}

#[tokio::test]
async fn deleting_a_page_cascades() {
    let editor = editor().await;
    let first = editor.active_page().await.id;
    let q = editor.add_question(QuestionType::SingleSelect, None).await;
    let handle = editor.set_question_image(&q, PNG.to_vec()).await.unwrap();
    editor.add_question(QuestionType::FillInBlank, None).await;

    let second = editor.add_page(Some("Second".into())).await;
    editor.add_question(QuestionType::FillInBlank, None).await;
    assert_eq!(editor.manifest().await.total_questions, 3);

    editor.delete_page(&first).await.unwrap();

    let manifest = editor.manifest().await;
    assert_eq!(manifest.total_pages, 1);
    assert_eq!(manifest.total_questions, 1);
    assert!(!manifest.contains_page(&first));
    assert_eq!(editor.store().pages.get(&first).await, None);
    assert_eq!(editor.store().assets.fetch(handle).await, None);
    assert_eq!(editor.active_page().await.id, second.id);
}

#[tokio::test]
async fn deleting_the_active_page_activates_the_first() {
    let editor = editor().await;
    let first = editor.active_page().await.id;
    let second = editor.add_page(None).await;
    editor.add_page(None).await;
    editor.switch_page(&second.id).await.unwrap();

    editor.delete_page(&second.id).await.unwrap();
    assert_eq!(editor.active_page().await.id, first);
    assert_eq!(editor.manifest().await.active_page, Some(first));
    assert_eq!(editor.manifest().await.total_pages, 2);
}

#[tokio::test]
async fn deleting_the_last_page_leaves_a_fresh_one() {
    let editor = editor().await;
    let only = editor.active_page().await.id;
    editor.add_question(QuestionType::FillInBlank, None).await;

    editor.delete_page(&only).await.unwrap();

    let manifest = editor.manifest().await;
    assert_eq!(manifest.total_pages, 1);
    assert_eq!(manifest.total_questions, 0);
    assert_ne!(manifest.page_order[0].id, only);
    assert_eq!(manifest.active_page.as_ref(), Some(&manifest.page_order[0].id));
    assert!(editor.active_page().await.is_empty());
}

#[tokio::test]
async fn question_image_replacement_releases_the_old_asset() {
    let editor = editor().await;
    let q = editor.add_question(QuestionType::FillInBlank, None).await;

    let old = editor.set_question_image(&q, PNG.to_vec()).await.unwrap();
    let new = editor.set_question_image(&q, b"GIF89a".to_vec()).await.unwrap();
    assert_ne!(old, new);
    assert_eq!(editor.store().assets.handles().await, vec![new]);

    editor.clear_question_image(&q).await.unwrap();
    assert!(editor.store().assets.handles().await.is_empty());
    assert!(editor.active_page().await.questions[0].image().is_none());

    let err = editor
        .set_question_image(&"missing".into(), PNG.to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::UnknownQuestion(_)));
    assert!(editor.store().assets.handles().await.is_empty());
}

#[tokio::test]
async fn time_limits_are_mutually_exclusive() {
    let editor = editor().await;
    editor.add_page(None).await;

    editor.set_time_limit(TimeLimit::Global(30)).await;
    let manifest = editor.manifest().await;
    assert_eq!(manifest.time_limit.global(), Some(30));
    assert_eq!(manifest.time_limit.per_page(), None);
    assert_eq!(editor.active_page().await.time_limit, None);

    editor.set_time_limit(TimeLimit::PerPage(5)).await;
    let document = editor.document().await;
    assert_eq!(document.manifest.time_limit.global(), None);
    assert!(document.pages.iter().all(|page| page.time_limit == Some(5)));
    assert_eq!(editor.active_page().await.time_limit, Some(5));
}

#[tokio::test]
async fn questions_stay_on_their_page() {
    let editor = editor().await;
    let q = editor.add_question(QuestionType::SingleSelect, None).await;
    let other = editor.add_page(None).await;

    let err = editor.move_question_to_page(&q, &other.id).unwrap_err();
    assert!(matches!(err, EditorError::CrossPageMove { .. }));

    // Questions on an inactive page cannot be edited either
    let err = editor.update_question(&q, "Moved?").await.unwrap_err();
    assert!(matches!(err, EditorError::UnknownQuestion(_)));
}

#[tokio::test]
async fn options_and_answers_through_the_editor() {
    let editor = editor().await;
    let q = editor.add_question(QuestionType::MultiSelect, Some("Primes".into())).await;
    let extra = editor.add_option(&q, "5").await.unwrap();
    let options: Vec<_> = editor.active_page().await.questions[0]
        .options()
        .iter()
        .map(|option| option.id.clone())
        .collect();
    editor.update_option(&q, &options[0], "2").await.unwrap();
    editor.update_option(&q, &options[1], "4").await.unwrap();

    assert!(editor.set_answer(&q, options[0].as_str()).await.unwrap());
    assert!(editor.set_answer(&q, extra.as_str()).await.unwrap());
    assert!(editor.reorder_options(&q, &extra, &options[0]).await.unwrap());

    editor.delete_option(&q, &extra).await.unwrap();
    let page = editor.active_page().await;
    assert_eq!(page.questions[0].options().len(), 2);
    assert_eq!(page.answers.get(&q), Some(&[options[0].as_str().to_string()][..]));

    editor.change_question_type(&q, QuestionType::FillInBlank).await.unwrap();
    assert!(editor.active_page().await.answers.is_empty());

    editor.delete_question(&q).await.unwrap();
    assert_eq!(editor.manifest().await.total_questions, 0);
}

#[tokio::test]
async fn metadata_edits_are_persisted() {
    let editor = editor().await;
    editor.set_name("Capitals").await;
    editor.set_description("Europe and Asia").await;
    let page = editor.active_page().await.id;
    editor.rename_page(&page, "Europe").await.unwrap();

    let stored = editor.store().manifest.load().await;
    assert_eq!(stored.name, "Capitals");
    assert_eq!(stored.description, "Europe and Asia");
    assert_eq!(stored.page_order[0].title, "Europe");
    assert_eq!(editor.active_page().await.title, "Europe");

    assert!(matches!(
        editor.rename_page(&"nowhere".into(), "x").await,
        Err(EditorError::UnknownPage(_))
    ));
}

#[tokio::test]
async fn reorder_pages_moves_source_to_target() {
    let editor = editor().await;
    let first = editor.active_page().await.id;
    let second = editor.add_page(None).await.id;
    let third = editor.add_page(None).await.id;

    assert!(editor.reorder_pages(&third, &first).await);
    let order: Vec<PageId> = editor
        .manifest()
        .await
        .page_order
        .into_iter()
        .map(|page| page.id)
        .collect();
    assert_eq!(order, vec![third.clone(), first, second]);
    assert!(!editor.reorder_pages(&third, &"nowhere".into()).await);
}

#[tokio::test]
async fn export_then_import_into_a_fresh_workspace() {
    let source = editor().await;
    source.set_name("Flags").await;
    let q = source.add_question(QuestionType::SingleSelect, None).await;
    source.set_question_image(&q, PNG.to_vec()).await.unwrap();
    let option = source.active_page().await.questions[0].options()[1].id.clone();
    source.set_answer(&q, option.as_str()).await.unwrap();
    source.add_page(Some("Second".into())).await;
    source.add_question(QuestionType::FillInBlank, None).await;
    let expected = source.document().await;

    let bytes = source.export_document().await.unwrap();

    let target = editor().await;
    let report = target.import_document(&bytes).await.unwrap();
    assert_eq!(report.pages, 2);
    assert_eq!(report.questions, 2);
    assert!(report.warnings.is_empty());

    let document = target.document().await;
    document.validate().unwrap();
    assert_eq!(document.manifest.name, "Flags");
    assert_eq!(document.manifest.active_page, Some(expected.pages[0].id.clone()));
    assert_eq!(target.active_page().await.id, expected.pages[0].id);
    assert_eq!(document.pages[1].title, "Second");
    assert_eq!(
        document.pages[0].answers.get(&q),
        Some(&[option.as_str().to_string()][..])
    );

    let image = document.pages[0].questions[0].image().and_then(AssetRef::session);
    let bytes = target.store().assets.fetch(image.unwrap()).await;
    assert_eq!(bytes.as_deref(), Some(PNG));
}

#[tokio::test]
async fn rejected_import_leaves_the_document_alone() {
    let editor = editor().await;
    editor.set_name("Keep").await;
    editor.add_question(QuestionType::FillInBlank, None).await;

    let err = editor.import_document(b"not a zip").await.unwrap_err();
    assert!(matches!(err, EditorError::Archive(_)));
    assert_eq!(editor.manifest().await.name, "Keep");
    assert_eq!(editor.active_page().await.questions.len(), 1);
}

#[tokio::test]
async fn json_previews_cover_every_page() {
    let editor = editor().await;
    editor.set_name("Preview").await;
    editor.add_question(QuestionType::FillInBlank, None).await;
    let second = editor.add_page(None).await;

    let json: serde_json::Value =
        serde_json::from_str(&editor.document_json().await.unwrap()).unwrap();
    assert_eq!(json["name"], "Preview");
    assert_eq!(json["pages"][0]["questions"][0]["text"], "Question 1");
    assert_eq!(json["pages"][1]["id"], second.id.as_str());

    let page: serde_json::Value =
        serde_json::from_str(&editor.page_json(&second.id).await.unwrap()).unwrap();
    assert_eq!(page["title"], "Page 2");
    assert!(editor.page_json(&"nowhere".into()).await.is_err());
}

#[tokio::test]
async fn autosave_follows_its_policy() {
    let immediate = Editor::open(QuizStore::in_memory(), AutoSaveConfig::immediate()).await;
    let page = immediate.active_page().await.id;
    assert!(!immediate.autosave_if_due().await);
    immediate.add_question(QuestionType::FillInBlank, None).await;
    assert!(immediate.autosave_if_due().await);
    assert!(!immediate.is_dirty().await);
    assert_eq!(
        immediate.store().pages.get(&page).await.unwrap().questions.len(),
        1
    );

    let disabled = editor().await;
    disabled.add_question(QuestionType::FillInBlank, None).await;
    assert!(!disabled.autosave_if_due().await);
    assert!(disabled.is_dirty().await);
}

#[tokio::test]
async fn directory_workspace_reopens_where_it_left_off() {
    let dir = tempfile::tempdir().unwrap();

    let second = {
        let editor = Editor::open(
            QuizStore::open_dir(dir.path()).unwrap(),
            AutoSaveConfig::default(),
        )
        .await;
        editor.set_name("Persistent").await;
        editor.add_question(QuestionType::FillInBlank, None).await;
        let second = editor.add_page(None).await;
        editor.add_question(QuestionType::SingleSelect, None).await;
        editor.flush().await;
        second
    };

    let editor = Editor::open(
        QuizStore::open_dir(dir.path()).unwrap(),
        AutoSaveConfig::default(),
    )
    .await;
    let manifest = editor.manifest().await;
    assert_eq!(manifest.name, "Persistent");
    assert_eq!(manifest.total_pages, 2);
    assert_eq!(manifest.total_questions, 2);
    assert_eq!(editor.active_page().await.id, second.id);
    assert_eq!(editor.active_page().await.questions.len(), 1);
    assert_eq!(editor.document().await.question_count(), 2);
}

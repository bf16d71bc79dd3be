//! Integration tests for editor crate

use pagecraft_editor::{
    AdapterError, AutosaveState, EditorConfig, EditorError, EditorSession, MockBackend,
    SaveOutcome, SectionKind, WorkflowError,
};
use pagecraft_model::{BlockData, BlockType, Command, Direction, Document, MetaField, WorkflowStatus};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn open(id: &str) -> EditorSession {
    EditorSession::open(Document::new(id), EditorConfig::default())
}

fn add(session: &mut EditorSession, block_type: BlockType) -> String {
    session
        .apply(Command::AddBlock {
            block_type,
            after_index: None,
        })
        .unwrap()
        .last()
        .unwrap()
        .id
        .clone()
}

fn blocks_json(session: &EditorSession) -> String {
    serde_json::to_string(session.blocks()).unwrap()
}

#[test]
fn test_undo_redo_is_byte_exact() {
    let mut session = open("undo");
    add(&mut session, BlockType::Hero);
    let text = add(&mut session, BlockType::Text);
    add(&mut session, BlockType::Faq);

    let commands = vec![
        Command::DuplicateBlock { id: text.clone() },
        Command::MoveBlock {
            id: text.clone(),
            direction: Direction::Up,
        },
        Command::RemoveBlock { id: text.clone() },
    ];

    for command in commands {
        let before = blocks_json(&session);
        session.apply(command).unwrap();
        let after = blocks_json(&session);

        assert!(session.undo().unwrap());
        assert_eq!(blocks_json(&session), before);

        assert!(session.redo().unwrap());
        assert_eq!(blocks_json(&session), after);
    }
}

#[test]
fn test_history_never_exceeds_limit() {
    let mut session = open("limit");
    let t0 = Instant::now();

    for i in 0..60u64 {
        session
            .apply_at(
                Command::AddBlock {
                    block_type: BlockType::Text,
                    after_index: None,
                },
                t0 + Duration::from_secs(i),
            )
            .unwrap();
        assert!(session.history().len() <= 50);
    }

    assert_eq!(session.history().len(), 50);

    let mut undos = 0;
    while session.undo().unwrap() {
        undos += 1;
    }
    assert_eq!(undos, 49);
    assert_eq!(session.blocks().len(), 11);
}

#[test]
fn test_typing_burst_is_one_history_entry() {
    let mut session = open("burst");
    let t0 = Instant::now();
    let id = session
        .apply_at(
            Command::AddBlock {
                block_type: BlockType::Text,
                after_index: None,
            },
            t0,
        )
        .unwrap()[0]
        .id
        .clone();
    let before = session.history().len();

    let burst_start = t0 + Duration::from_secs(1);
    for i in 0..29u64 {
        session
            .apply_at(
                Command::UpdateBlock {
                    id: id.clone(),
                    data: json!({ "contents": "x".repeat(i as usize + 1) })
                        .as_object()
                        .unwrap()
                        .clone(),
                },
                burst_start + Duration::from_millis(i * 13),
            )
            .unwrap();
    }

    assert!(session.history().len() - before <= 1);

    // One undo returns to the pre-burst text
    session.undo().unwrap();
    match &session.blocks()[0].data {
        BlockData::Text(data) => assert_eq!(data.contents, ""),
        other => panic!("Expected text payload, got {:?}", other),
    }
}

#[tokio::test]
async fn test_autosave_cycle() {
    let backend = MockBackend::new();
    let config = EditorConfig {
        autosave_debounce_ms: 0,
        ..Default::default()
    };
    let mut session = EditorSession::open(Document::new("autosave"), config);

    // Clean documents are never saved
    assert!(session.autosave_if_due(&backend).await.is_none());

    add(&mut session, BlockType::Text);
    let outcome = session.autosave_if_due(&backend).await.unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));
    assert!(!session.is_dirty());
    assert_eq!(session.autosave_state(), AutosaveState::Saved);
    assert!(session.last_saved_at().is_some());
    assert_eq!(backend.saves(), 1);

    let saved = backend.document("autosave").unwrap();
    assert_eq!(saved.blocks(), session.blocks());

    assert!(session.autosave_if_due(&backend).await.is_none());
}

#[tokio::test]
async fn test_failed_autosave_keeps_dirty_until_next_edit() {
    let backend = MockBackend::new();
    let config = EditorConfig {
        autosave_debounce_ms: 0,
        ..Default::default()
    };
    let mut session = EditorSession::open(Document::new("failing"), config);

    backend.set_fail_saves(true);
    add(&mut session, BlockType::Text);
    let outcome = session.autosave_if_due(&backend).await.unwrap();

    assert!(matches!(
        outcome,
        SaveOutcome::Failed {
            error: AdapterError::Transport(_)
        }
    ));
    assert!(session.is_dirty());
    assert_eq!(session.autosave_state(), AutosaveState::Idle);
    assert_eq!(session.next_autosave_deadline(), None);
    assert!(session.autosave_if_due(&backend).await.is_none());

    backend.set_fail_saves(false);
    add(&mut session, BlockType::Faq);
    let outcome = session.autosave_if_due(&backend).await.unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));
    assert!(!session.is_dirty());
    assert_eq!(backend.document("failing").unwrap().blocks().len(), 2);
}

#[tokio::test]
async fn test_publish_gates() {
    let backend = MockBackend::new();
    let mut session = open("publish");
    add(&mut session, BlockType::Hero);

    let err = session.publish(&backend).await.unwrap_err();
    assert!(matches!(
        err,
        EditorError::Workflow(WorkflowError::NotApproved(WorkflowStatus::Draft))
    ));

    session.submit_for_review().unwrap();
    session.approve().unwrap();

    let err = session.publish(&backend).await.unwrap_err();
    match err {
        EditorError::Workflow(WorkflowError::SeoBlocked(blocking)) => {
            assert!(blocking.contains(&"Missing title".to_string()));
            assert!(blocking.contains(&"Missing hero image".to_string()));
        }
        other => panic!("Expected SEO refusal, got {:?}", other),
    }
    assert_eq!(session.document().status, WorkflowStatus::Approved);
    assert_eq!(backend.publishes(), 0);

    session.update_meta(MetaField::Title, "Lisbon travel guide").unwrap();
    session
        .update_meta(MetaField::MetaDescription, "Everything you need for Lisbon")
        .unwrap();
    session.update_meta(MetaField::HeroImage, "/images/lisbon.webp").unwrap();
    assert!(session.seo_validation().can_publish);

    let outcome = session.publish(&backend).await.unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));
    assert_eq!(session.document().status, WorkflowStatus::Published);
    assert!(!session.is_dirty());
    assert_eq!(
        backend.document("publish").unwrap().status,
        WorkflowStatus::Published
    );
}

#[tokio::test]
async fn test_failed_publish_leaves_status() {
    let backend = MockBackend::new();
    let mut doc = Document::new("publish-fail");
    doc.title = "Lisbon travel guide".to_string();
    doc.meta_description = "Everything you need for Lisbon".to_string();
    doc.hero_image = "/images/lisbon.webp".to_string();
    doc.status = WorkflowStatus::Approved;
    let mut session = EditorSession::open(doc, EditorConfig::default());

    backend.set_fail_saves(true);
    let outcome = session.publish(&backend).await.unwrap();

    assert!(matches!(outcome, SaveOutcome::Failed { .. }));
    assert_eq!(session.document().status, WorkflowStatus::Approved);
}

#[tokio::test]
async fn test_restore_version_discards_local_edits() {
    let backend = MockBackend::new();
    let mut session = open("restore");

    add(&mut session, BlockType::Hero);
    session.update_meta(MetaField::Title, "First").unwrap();
    session.save(&backend).await.unwrap();

    add(&mut session, BlockType::Text);
    session.save(&backend).await.unwrap();

    let versions = session.list_versions(&backend).await.unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].version_number, 2);
    let first = versions[1].clone();

    add(&mut session, BlockType::Faq);
    assert!(session.is_dirty());
    let pending = session.begin_save().unwrap();

    session.restore_version(&backend, &first.id).await.unwrap();

    assert_eq!(session.blocks(), first.blocks.as_slice());
    assert_eq!(session.document().title, "First");
    assert!(!session.is_dirty());
    assert!(session.diff_against(&first).is_empty());

    // The save issued before the restore is stale now
    let outcome = session.finish_save_at(pending.ticket, Ok(Document::new("restore")), Instant::now());
    assert_eq!(outcome, SaveOutcome::Discarded);
    assert_eq!(session.blocks(), first.blocks.as_slice());

    // Restore is one undo step
    session.undo().unwrap();
    assert_eq!(session.blocks().len(), 3);
    assert_eq!(session.diff_against(&first).blocks.len(), 2);
}

#[tokio::test]
async fn test_failed_restore_leaves_document() {
    let backend = MockBackend::new();
    let mut session = open("restore-fail");
    add(&mut session, BlockType::Hero);
    let before = blocks_json(&session);

    let err = session.restore_version(&backend, "missing").await.unwrap_err();

    assert!(matches!(err, EditorError::Adapter(AdapterError::NotFound(_))));
    assert_eq!(blocks_json(&session), before);
    assert!(session.is_dirty());
}

#[tokio::test]
async fn test_generate_section() {
    let backend = MockBackend::new();
    let mut session = open("generate");
    session.update_meta(MetaField::Title, "Lisbon").unwrap();
    let faq = add(&mut session, BlockType::Faq);
    let text = add(&mut session, BlockType::Text);

    assert!(session.generate_section(&faq, &backend).await.unwrap());
    match &session.document().block(&faq).unwrap().data {
        BlockData::Faq(data) => {
            assert_eq!(data.question, "What should I know about Lisbon?");
            assert!(!data.answer.is_empty());
        }
        other => panic!("Expected faq payload, got {:?}", other),
    }

    let err = session.generate_section(&text, &backend).await.unwrap_err();
    assert!(matches!(
        err,
        EditorError::NotGeneratable {
            block_type: BlockType::Text,
            ..
        }
    ));

    let err = session.generate_section("ghost", &backend).await.unwrap_err();
    assert!(matches!(err, EditorError::BlockNotFound(_)));

    // Generation is undoable
    session.undo().unwrap();
    match &session.document().block(&faq).unwrap().data {
        BlockData::Faq(data) => assert_eq!(data.question, ""),
        other => panic!("Expected faq payload, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generated_payload_that_does_not_fit_is_ignored() {
    let backend = MockBackend::new();
    backend.set_section(
        SectionKind::Tips,
        json!({ "items": "not a list" }).as_object().unwrap().clone(),
    );
    let mut session = open("generate-bad");
    let tips = add(&mut session, BlockType::Tips);
    let history_before = session.history().len();
    let before = blocks_json(&session);

    assert!(!session.generate_section(&tips, &backend).await.unwrap());
    assert_eq!(blocks_json(&session), before);
    assert_eq!(session.history().len(), history_before);
}

#[tokio::test(start_paused = true)]
async fn test_lock_is_advisory_and_stops_on_close() {
    let backend = MockBackend::new();
    let mut session = open("locked");
    session.start_lock_polling(Arc::new(backend.clone())).unwrap();

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(session.lock_status().map(|s| s.is_locked), Some(false));

    backend.set_lock("locked", Some("ana"));
    tokio::time::sleep(Duration::from_secs(30)).await;
    let status = session.lock_status().unwrap();
    assert!(status.is_locked);
    assert_eq!(status.locked_by.as_deref(), Some("ana"));

    // Edits and saves still go through
    add(&mut session, BlockType::Text);
    let outcome = session.save(&backend).await.unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));

    session.close();
    assert!(!session.is_polling_lock());
    let polls = backend.lock_polls();

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(backend.lock_polls(), polls);
}

#[test]
fn test_seo_report_tracks_session_edits() {
    let mut session = open("seo");
    let empty = session.seo_report();
    assert!(empty.issues.contains(&"No contents blocks".to_string()));

    add(&mut session, BlockType::Hero);
    let report = session.seo_report();
    assert!(!report.issues.contains(&"No contents blocks".to_string()));
    assert!(report.score > empty.score);

    assert_eq!(session.seo_report(), report);
}

//! Ordering of overlapping save responses

use async_trait::async_trait;
use pagecraft_editor::{
    AdapterError, AdapterResult, AutosaveState, EditorConfig, EditorSession, PersistenceApi,
    SaveOrigin, SaveOutcome, SavePayload,
};
use pagecraft_model::{BlockType, Command, Document};
use serde_json::json;
use std::time::{Duration, Instant};

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Session with one text block, edited at `t0`
fn edited_session(t0: Instant) -> (EditorSession, String) {
    let mut session = EditorSession::open(Document::new("race"), EditorConfig::default());
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
    (session, id)
}

fn type_text(session: &mut EditorSession, id: &str, text: &str, at: Instant) {
    session
        .apply_at(
            Command::UpdateBlock {
                id: id.to_string(),
                data: json!({ "contents": text }).as_object().unwrap().clone(),
            },
            at,
        )
        .unwrap();
}

fn server_ok() -> Result<Document, AdapterError> {
    Ok(Document::new("race"))
}

/// Backend that never answers
struct Unresponsive;

#[async_trait]
impl PersistenceApi for Unresponsive {
    async fn save(&self, _document_id: &str, _payload: SavePayload) -> AdapterResult<Document> {
        std::future::pending().await
    }

    async fn publish(&self, _document_id: &str, _document: Document) -> AdapterResult<Document> {
        std::future::pending().await
    }
}

#[test]
fn test_stale_autosave_landing_after_manual_save_is_discarded() {
    let t0 = Instant::now();
    let (mut session, id) = edited_session(t0);

    let autosave = session.begin_autosave_at(t0 + secs(30)).unwrap();
    type_text(&mut session, &id, "manual edit", t0 + secs(31));
    let manual = session.begin_save().unwrap();

    assert_eq!(autosave.ticket.origin, SaveOrigin::Autosave);
    assert!(manual.ticket.seq > autosave.ticket.seq);

    let outcome = session.finish_save_at(manual.ticket, server_ok(), t0 + secs(32));
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));
    assert!(!session.is_dirty());

    let outcome = session.finish_save_at(autosave.ticket, server_ok(), t0 + secs(33));
    assert_eq!(outcome, SaveOutcome::Discarded);
    assert!(!session.is_dirty());
    assert_eq!(session.autosave_state_at(t0 + secs(33)), AutosaveState::Saved);
    assert_eq!(session.autosave_state_at(t0 + secs(35)), AutosaveState::Idle);
}

#[test]
fn test_stale_autosave_landing_before_manual_save_is_discarded() {
    let t0 = Instant::now();
    let (mut session, id) = edited_session(t0);

    let autosave = session.begin_autosave_at(t0 + secs(30)).unwrap();
    type_text(&mut session, &id, "manual edit", t0 + secs(31));
    let manual = session.begin_save().unwrap();

    let outcome = session.finish_save_at(autosave.ticket, server_ok(), t0 + secs(32));
    assert_eq!(outcome, SaveOutcome::Discarded);
    assert!(session.is_dirty());
    assert_eq!(session.autosave_state_at(t0 + secs(32)), AutosaveState::Saving);

    let outcome = session.finish_save_at(manual.ticket, server_ok(), t0 + secs(33));
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));
    assert!(!session.is_dirty());
}

#[test]
fn test_autosave_with_later_edits_keeps_dirty_and_rearms() {
    let t0 = Instant::now();
    let (mut session, id) = edited_session(t0);

    let autosave = session.begin_autosave_at(t0 + secs(30)).unwrap();
    type_text(&mut session, &id, "typed while saving", t0 + secs(31));

    // No timer while a save is out
    assert_eq!(session.next_autosave_deadline(), None);

    let outcome = session.finish_save_at(autosave.ticket, server_ok(), t0 + secs(32));
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));
    assert!(session.is_dirty());
    assert_eq!(session.next_autosave_deadline(), Some(t0 + secs(62)));

    let next = session.begin_autosave_at(t0 + secs(62)).unwrap();
    assert!(next.ticket.seq > autosave.ticket.seq);
    assert_eq!(next.payload.content_text, "typed while saving");
}

#[test]
fn test_manual_save_cancels_pending_timer() {
    let t0 = Instant::now();
    let (mut session, _) = edited_session(t0);
    assert!(session.next_autosave_deadline().is_some());

    let manual = session.begin_save().unwrap();
    assert_eq!(manual.ticket.origin, SaveOrigin::Manual);
    assert_eq!(session.next_autosave_deadline(), None);
    assert!(session.begin_autosave_at(t0 + secs(60)).is_none());
}

#[test]
fn test_failed_manual_save_keeps_edits_dirty() {
    let t0 = Instant::now();
    let (mut session, _) = edited_session(t0);

    let manual = session.begin_save().unwrap();
    let outcome = session.finish_save_at(
        manual.ticket,
        Err(AdapterError::Transport("offline".to_string())),
        t0 + secs(1),
    );

    assert_eq!(
        outcome,
        SaveOutcome::Failed {
            error: AdapterError::Transport("offline".to_string())
        }
    );
    assert!(session.is_dirty());
    assert_eq!(session.autosave_state_at(t0 + secs(1)), AutosaveState::Idle);
}

#[test]
fn test_failed_autosave_rearms_for_edits_typed_while_saving() {
    let t0 = Instant::now();
    let (mut session, id) = edited_session(t0);

    let autosave = session.begin_autosave_at(t0 + secs(30)).unwrap();
    type_text(&mut session, &id, "typed while saving", t0 + secs(31));

    let outcome = session.finish_save_at(
        autosave.ticket,
        Err(AdapterError::Transport("offline".to_string())),
        t0 + secs(32),
    );

    assert!(matches!(outcome, SaveOutcome::Failed { .. }));
    assert!(session.is_dirty());
    assert_eq!(session.next_autosave_deadline(), Some(t0 + secs(62)));

    let retry = session.begin_autosave_at(t0 + secs(62)).unwrap();
    assert_eq!(retry.payload.content_text, "typed while saving");
}

#[test]
fn test_failed_autosave_without_new_edits_waits_for_next_edit() {
    let t0 = Instant::now();
    let (mut session, _) = edited_session(t0);

    let autosave = session.begin_autosave_at(t0 + secs(30)).unwrap();
    session.finish_save_at(
        autosave.ticket,
        Err(AdapterError::Transport("offline".to_string())),
        t0 + secs(31),
    );

    assert!(session.is_dirty());
    assert_eq!(session.next_autosave_deadline(), None);
    assert!(session.begin_autosave_at(t0 + secs(3600)).is_none());
}

#[test]
fn test_abandoned_request_does_not_block_autosave() {
    let t0 = Instant::now();
    let (mut session, id) = edited_session(t0);

    let manual = session.begin_save().unwrap();
    session.abandon_request_at(manual.ticket, t0 + secs(1));
    assert_eq!(session.autosave_state_at(t0 + secs(1)), AutosaveState::Idle);

    type_text(&mut session, &id, "after the lost save", t0 + secs(2));
    assert!(session.begin_autosave_at(t0 + secs(32)).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_save_future_releases_in_flight_slot() {
    let t0 = Instant::now();
    let (mut session, id) = edited_session(t0);

    let cancelled = tokio::time::timeout(secs(1), session.save(&Unresponsive)).await;
    assert!(cancelled.is_err());
    assert!(session.is_dirty());
    assert_eq!(session.autosave_state_at(t0), AutosaveState::Idle);

    let edited_at = Instant::now();
    type_text(&mut session, &id, "edited after timeout", edited_at);
    assert_eq!(session.next_autosave_deadline(), Some(edited_at + secs(30)));
    assert!(session.begin_autosave_at(edited_at + secs(30)).is_some());
}

#[test]
fn test_response_after_close_is_ignored() {
    let t0 = Instant::now();
    let (mut session, _) = edited_session(t0);

    let manual = session.begin_save().unwrap();
    session.close();

    let outcome = session.finish_save_at(manual.ticket, server_ok(), t0 + secs(1));
    assert_eq!(outcome, SaveOutcome::Discarded);
    assert!(session.is_dirty());
}

#[test]
fn test_payload_sequence_matches_ticket() {
    let t0 = Instant::now();
    let (mut session, id) = edited_session(t0);
    type_text(&mut session, &id, "one two three", t0 + secs(1));

    let request = session.begin_save().unwrap();
    assert_eq!(request.payload.edit_seq, request.ticket.seq);
    assert_eq!(request.ticket.seq, session.edit_seq());
    assert_eq!(request.payload.word_count, 3);
    assert_eq!(request.document_id, "race");
}

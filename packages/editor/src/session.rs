//! # Editor Session
//!
//! Owns one open page: the document, its undo stack, the autosave state and
//! the dirty flag. Everything that happens to a page while it is open goes
//! through the session.
//!
//! ## Design
//!
//! - Mutations run synchronously to completion through [`Command`]s
//! - Persistence is split into `begin_*` (capture a request) and `finish_*`
//!   (apply the response) so responses can arrive in any order; the async
//!   helpers (`save`, `publish`, ...) just chain the two
//! - Every edit bumps `edit_seq`. A request carries the sequence it was
//!   captured at, and responses older than the newest acknowledged or
//!   manually issued save are dropped
//! - `close()` cancels the autosave timer and the lock poller; responses
//!   landing afterwards are dropped
//!
//! ## Save Race
//!
//! ```text
//!   autosave(seq 3) ─────────────────────────────┐
//!   edit (seq 4)                                 │
//!   manual save(seq 4) ──────┐                   │
//!                            ▼ saved, floor = 4  ▼ seq 3 < 4: discarded
//! ```

use crate::autosave::{AutosaveScheduler, AutosaveState};
use crate::backend::{
    AdapterResult, LockApi, LockStatus, PersistenceApi, SavePayload, SectionGenerator,
    SectionKind, Version, VersionStore,
};
use crate::config::EditorConfig;
use crate::diff::{diff, VersionDiff};
use crate::errors::{AdapterError, EditorError};
use crate::lock::LockPoller;
use crate::undo_stack::UndoStack;
use crate::workflow::{self, WorkflowAction};
use chrono::{DateTime, Utc};
use pagecraft_model::{
    content_text, Applied, Block, Command, CommandKind, Document, MetaField, WorkflowStatus,
};
use pagecraft_seo::{score, validate, SeoReport, SeoValidation};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOrigin {
    Autosave,
    Manual,
    Publish,
}

/// Identifies an outbound persistence call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    /// Edit sequence the request was captured at
    pub seq: u64,
    pub origin: SaveOrigin,
}

#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub ticket: SaveTicket,
    pub document_id: String,
    pub payload: SavePayload,
}

#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub ticket: SaveTicket,
    pub document_id: String,
    pub document: Document,
}

/// What a persistence response did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved { at: DateTime<Utc> },

    /// The response was older than the session's state and was ignored
    Discarded,

    Failed { error: AdapterError },
}

pub struct EditorSession {
    document: Document,
    config: EditorConfig,
    history: UndoStack,
    autosave: AutosaveScheduler,
    selection: Option<String>,

    /// Bumped by every local edit
    edit_seq: u64,

    /// Responses captured before this sequence are stale
    floor_seq: u64,

    lock: Option<LockPoller>,
    closed: bool,
}

impl EditorSession {
    /// Open a page for editing
    pub fn open(mut document: Document, config: EditorConfig) -> Self {
        let repaired = document.normalize();
        if repaired > 0 {
            warn!(document_id = %document.id, repaired, "Opened document had clashing block ids");
        }

        let mut history = UndoStack::with_limits(config.history_limit, config.history_debounce());
        if let Err(e) = history.reset(document.blocks()) {
            warn!(document_id = %document.id, error = %e, "Could not capture initial history entry");
        }

        let autosave = AutosaveScheduler::new(config.autosave_debounce(), config.saved_indicator());

        info!(
            document_id = %document.id,
            blocks = document.blocks().len(),
            status = %document.status,
            "Editor session opened"
        );

        Self {
            document,
            config,
            history,
            autosave,
            selection: None,
            edit_seq: 0,
            floor_seq: 0,
            lock: None,
            closed: false,
        }
    }

    /// Tear the session down; pending timers and polls are cancelled
    pub fn close(&mut self) {
        if self.closed {
            return;
        }

        self.closed = true;
        self.autosave.cancel();
        if let Some(mut poller) = self.lock.take() {
            poller.stop();
        }

        if self.autosave.is_dirty() {
            warn!(document_id = %self.document.id, "Editor session closed with unsaved changes");
        }
        info!(document_id = %self.document.id, "Editor session closed");
    }

    fn ensure_open(&self) -> Result<(), EditorError> {
        if self.closed {
            Err(EditorError::SessionClosed)
        } else {
            Ok(())
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn blocks(&self) -> &[Block] {
        self.document.blocks()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    pub fn edit_seq(&self) -> u64 {
        self.edit_seq
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Apply a block command and return the new block sequence
    pub fn apply(&mut self, command: Command) -> Result<&[Block], EditorError> {
        self.apply_at(command, Instant::now())
    }

    pub fn apply_at(&mut self, command: Command, now: Instant) -> Result<&[Block], EditorError> {
        self.ensure_open()?;
        let kind = command.kind();
        self.commit_at(command, kind, now);
        Ok(self.document.blocks())
    }

    fn commit_at(&mut self, command: Command, kind: CommandKind, now: Instant) -> Applied {
        let name = command.name();
        let applied = self.document.execute(command);
        if !applied.changed {
            return applied;
        }

        if let Err(e) = self.history.record_at(self.document.blocks(), kind, now) {
            warn!(command = name, error = %e, "Skipped history entry");
        }

        self.touch_at(now);
        self.prune_selection();
        applied
    }

    /// Set a page-level field; returns whether it changed. Metadata is not
    /// part of undo history.
    pub fn update_meta(&mut self, field: MetaField, value: impl Into<String>) -> Result<bool, EditorError> {
        self.update_meta_at(field, value, Instant::now())
    }

    pub fn update_meta_at(
        &mut self,
        field: MetaField,
        value: impl Into<String>,
        now: Instant,
    ) -> Result<bool, EditorError> {
        self.ensure_open()?;
        let changed = self.document.set_meta(field, value);
        if changed {
            self.touch_at(now);
        }
        Ok(changed)
    }

    fn touch_at(&mut self, now: Instant) {
        self.edit_seq += 1;
        let armable = self.autosave_armable();
        self.autosave.note_mutation_at(armable, now);
    }

    fn autosave_armable(&self) -> bool {
        !self.config.autosave_only_drafts || self.document.status == WorkflowStatus::Draft
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select a block; unknown ids are ignored
    pub fn select(&mut self, id: &str) -> bool {
        if self.document.contains(id) {
            self.selection = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    fn prune_selection(&mut self) {
        if let Some(id) = &self.selection {
            if !self.document.contains(id) {
                debug!(block_id = %id, "Selected block is gone, clearing selection");
                self.selection = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.undo_at(Instant::now())
    }

    pub fn undo_at(&mut self, now: Instant) -> Result<bool, EditorError> {
        self.ensure_open()?;
        let Some(blocks) = self.history.undo() else {
            return Ok(false);
        };
        self.restore_blocks(blocks, now);
        Ok(true)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        self.redo_at(Instant::now())
    }

    pub fn redo_at(&mut self, now: Instant) -> Result<bool, EditorError> {
        self.ensure_open()?;
        let Some(blocks) = self.history.redo() else {
            return Ok(false);
        };
        self.restore_blocks(blocks, now);
        Ok(true)
    }

    fn restore_blocks(&mut self, blocks: Vec<Block>, now: Instant) {
        self.document.replace_blocks(blocks);
        self.touch_at(now);
        self.prune_selection();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    // ------------------------------------------------------------------
    // SEO and workflow
    // ------------------------------------------------------------------

    /// Score of the current state, recomputed on every call
    pub fn seo_report(&self) -> SeoReport {
        score(&self.document)
    }

    pub fn seo_validation(&self) -> SeoValidation {
        validate(&self.seo_report(), &self.config.seo)
    }

    pub fn submit_for_review(&mut self) -> Result<(), EditorError> {
        self.ensure_open()?;
        workflow::submit_for_review(&mut self.document)?;
        self.touch_at(Instant::now());
        Ok(())
    }

    pub fn approve(&mut self) -> Result<(), EditorError> {
        self.ensure_open()?;
        workflow::approve(&mut self.document)?;
        self.touch_at(Instant::now());
        Ok(())
    }

    pub fn request_changes(&mut self) -> Result<(), EditorError> {
        self.ensure_open()?;
        workflow::request_changes(&mut self.document)?;
        self.touch_at(Instant::now());
        Ok(())
    }

    pub fn schedule(&mut self, at: DateTime<Utc>) -> Result<(), EditorError> {
        self.ensure_open()?;
        workflow::schedule(&mut self.document, at, Utc::now())?;
        self.touch_at(Instant::now());
        Ok(())
    }

    pub fn unschedule(&mut self) -> Result<(), EditorError> {
        self.ensure_open()?;
        workflow::unschedule(&mut self.document)?;
        self.touch_at(Instant::now());
        Ok(())
    }

    /// Publish a scheduled page whose time has come
    pub fn fire_schedule(&mut self, now: DateTime<Utc>) -> Result<bool, EditorError> {
        self.ensure_open()?;
        let fired = workflow::fire_schedule(&mut self.document, now);
        if fired {
            self.touch_at(Instant::now());
        }
        Ok(fired)
    }

    pub fn available_actions(&self) -> &'static [WorkflowAction] {
        workflow::available_actions(self.document.status)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    fn issue(&mut self, origin: SaveOrigin) -> SaveTicket {
        self.autosave.begin();
        if origin != SaveOrigin::Autosave {
            self.floor_seq = self.floor_seq.max(self.edit_seq);
        }
        SaveTicket {
            seq: self.edit_seq,
            origin,
        }
    }

    fn save_request(&mut self, origin: SaveOrigin) -> SaveRequest {
        let ticket = self.issue(origin);
        debug!(seq = ticket.seq, origin = ?origin, "Save issued");
        SaveRequest {
            ticket,
            document_id: self.document.id.clone(),
            payload: SavePayload::capture(&self.document, ticket.seq),
        }
    }

    /// Start an autosave if the quiet timer has elapsed
    pub fn begin_autosave_at(&mut self, now: Instant) -> Option<SaveRequest> {
        if self.closed || !self.autosave.is_due_at(now) {
            return None;
        }
        Some(self.save_request(SaveOrigin::Autosave))
    }

    /// Start a manual save, bypassing the debounce
    pub fn begin_save(&mut self) -> Result<SaveRequest, EditorError> {
        self.ensure_open()?;
        self.autosave.cancel();
        Ok(self.save_request(SaveOrigin::Manual))
    }

    /// Apply a save response
    pub fn finish_save_at(
        &mut self,
        ticket: SaveTicket,
        result: AdapterResult<Document>,
        now: Instant,
    ) -> SaveOutcome {
        if let Some(outcome) = self.reject_stale(ticket, now) {
            return outcome;
        }

        match result {
            Ok(_) => self.acknowledge(ticket, now),
            Err(error) => {
                let armable = self.autosave_armable();
                self.autosave.fail_at(armable, now);
                warn!(seq = ticket.seq, origin = ?ticket.origin, error = %error, "Save failed");
                SaveOutcome::Failed { error }
            }
        }
    }

    /// Give up on a request whose response will never be applied, e.g. when
    /// the future driving it was dropped. The edits it captured stay dirty.
    pub fn abandon_request_at(&mut self, ticket: SaveTicket, now: Instant) {
        if self.closed {
            return;
        }

        let armable = self.autosave_armable();
        self.autosave.abandon_at(armable, now);
        debug!(seq = ticket.seq, origin = ?ticket.origin, "Save request abandoned");
    }

    fn reject_stale(&mut self, ticket: SaveTicket, now: Instant) -> Option<SaveOutcome> {
        if self.closed {
            debug!(seq = ticket.seq, "Response after close ignored");
            return Some(SaveOutcome::Discarded);
        }

        if ticket.seq < self.floor_seq {
            warn!(
                seq = ticket.seq,
                floor = self.floor_seq,
                origin = ?ticket.origin,
                "Discarding stale save response"
            );
            let armable = self.autosave_armable();
            self.autosave.discard_at(armable, now);
            return Some(SaveOutcome::Discarded);
        }

        None
    }

    fn acknowledge(&mut self, ticket: SaveTicket, now: Instant) -> SaveOutcome {
        self.floor_seq = self.floor_seq.max(ticket.seq);
        let clean = ticket.seq == self.edit_seq;
        let at = Utc::now();
        let armable = self.autosave_armable();
        self.autosave.succeed_at(clean, armable, now, at);

        info!(
            document_id = %self.document.id,
            seq = ticket.seq,
            origin = ?ticket.origin,
            clean,
            "Saved"
        );
        SaveOutcome::Saved { at }
    }

    /// Check the publish preconditions and capture the document to publish
    pub fn begin_publish(&mut self) -> Result<PublishRequest, EditorError> {
        self.ensure_open()?;
        workflow::check_publish(&self.document, &self.seo_validation())?;

        self.autosave.cancel();
        let ticket = self.issue(SaveOrigin::Publish);

        let mut document = self.document.clone();
        document.status = WorkflowStatus::Published;
        document.scheduled_at = None;

        Ok(PublishRequest {
            ticket,
            document_id: self.document.id.clone(),
            document,
        })
    }

    /// Apply a publish response; the page only becomes published once the
    /// backend confirmed it
    pub fn finish_publish_at(
        &mut self,
        ticket: SaveTicket,
        result: AdapterResult<Document>,
        now: Instant,
    ) -> SaveOutcome {
        if let Some(outcome) = self.reject_stale(ticket, now) {
            return outcome;
        }

        match result {
            Ok(_) => {
                workflow::mark_published(&mut self.document);
                self.autosave.cancel();
                self.acknowledge(ticket, now)
            }
            Err(error) => {
                let armable = self.autosave_armable();
                self.autosave.fail_at(armable, now);
                warn!(error = %error, "Publish failed");
                SaveOutcome::Failed { error }
            }
        }
    }

    /// Run an autosave if one is due
    #[instrument(skip(self, api), fields(document_id = %self.document.id))]
    pub async fn autosave_if_due(&mut self, api: &dyn PersistenceApi) -> Option<SaveOutcome> {
        let request = self.begin_autosave_at(Instant::now())?;
        let pending = InFlight::new(self, request.ticket);
        let result = api.save(&request.document_id, request.payload).await;
        Some(pending.finish(|session, ticket| session.finish_save_at(ticket, result, Instant::now())))
    }

    #[instrument(skip(self, api), fields(document_id = %self.document.id))]
    pub async fn save(&mut self, api: &dyn PersistenceApi) -> Result<SaveOutcome, EditorError> {
        let request = self.begin_save()?;
        let pending = InFlight::new(self, request.ticket);
        let result = api.save(&request.document_id, request.payload).await;
        Ok(pending.finish(|session, ticket| session.finish_save_at(ticket, result, Instant::now())))
    }

    #[instrument(skip(self, api), fields(document_id = %self.document.id))]
    pub async fn publish(&mut self, api: &dyn PersistenceApi) -> Result<SaveOutcome, EditorError> {
        let request = self.begin_publish()?;
        let pending = InFlight::new(self, request.ticket);
        let result = api.publish(&request.document_id, request.document).await;
        Ok(pending.finish(|session, ticket| session.finish_publish_at(ticket, result, Instant::now())))
    }

    pub fn autosave_state(&self) -> AutosaveState {
        self.autosave.state()
    }

    pub fn autosave_state_at(&self, now: Instant) -> AutosaveState {
        self.autosave.state_at(now)
    }

    pub fn next_autosave_deadline(&self) -> Option<Instant> {
        self.autosave.next_deadline()
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.autosave.last_saved_at()
    }

    // ------------------------------------------------------------------
    // Versions
    // ------------------------------------------------------------------

    /// Versions of this page, newest first
    #[instrument(skip(self, store), fields(document_id = %self.document.id))]
    pub async fn list_versions(&self, store: &dyn VersionStore) -> Result<Vec<Version>, EditorError> {
        let mut versions = store.list_versions(&self.document.id).await?;
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        Ok(versions)
    }

    /// Make a stored version the live state.
    ///
    /// Uncommitted local edits are discarded and in-flight saves become
    /// stale. The restore itself is one undo step. On failure the document
    /// is left untouched.
    #[instrument(skip(self, store), fields(document_id = %self.document.id))]
    pub async fn restore_version(
        &mut self,
        store: &dyn VersionStore,
        version_id: &str,
    ) -> Result<(), EditorError> {
        self.ensure_open()?;
        let restored = store.restore_version(&self.document.id, version_id).await?;
        self.install_restored_at(restored, Instant::now());
        Ok(())
    }

    fn install_restored_at(&mut self, mut restored: Document, now: Instant) {
        restored.normalize();
        if restored.id != self.document.id {
            warn!(expected = %self.document.id, got = %restored.id, "Restored document id differs");
            restored.id = self.document.id.clone();
        }
        self.document = restored;

        if let Err(e) = self
            .history
            .record_at(self.document.blocks(), CommandKind::Discrete, now)
        {
            warn!(error = %e, "Skipped history entry for restore");
        }

        // The server already holds this state
        self.edit_seq += 1;
        self.floor_seq = self.edit_seq;
        self.autosave.mark_clean();
        self.prune_selection();

        info!(document_id = %self.document.id, seq = self.edit_seq, "Version restored");
    }

    /// Changes from a stored version to the live state
    pub fn diff_against(&self, version: &Version) -> VersionDiff {
        diff(&self.document, version)
    }

    // ------------------------------------------------------------------
    // External services
    // ------------------------------------------------------------------

    /// Fill a FAQ, tips or highlights block from the generation service.
    /// The merge is one undo step. Returns whether the block changed.
    #[instrument(skip(self, generator), fields(document_id = %self.document.id))]
    pub async fn generate_section(
        &mut self,
        block_id: &str,
        generator: &dyn SectionGenerator,
    ) -> Result<bool, EditorError> {
        self.ensure_open()?;

        let block = self
            .document
            .block(block_id)
            .ok_or_else(|| EditorError::BlockNotFound(block_id.to_string()))?;
        let block_type = block.block_type();
        let kind = SectionKind::for_block_type(block_type).ok_or_else(|| EditorError::NotGeneratable {
            id: block_id.to_string(),
            block_type,
        })?;

        let existing = content_text(self.document.blocks());
        let title = self.document.title.clone();
        let data = generator.generate_section(kind, &title, &existing).await?;

        let applied = self.commit_at(
            Command::UpdateBlock {
                id: block_id.to_string(),
                data,
            },
            CommandKind::Discrete,
            Instant::now(),
        );

        debug!(block_id = %block_id, kind = kind.as_str(), changed = applied.changed, "Section generated");
        Ok(applied.changed)
    }

    /// Start polling the advisory lock; replaces any running poller
    pub fn start_lock_polling(
        &mut self,
        api: Arc<dyn LockApi>,
    ) -> Result<watch::Receiver<LockStatus>, EditorError> {
        self.ensure_open()?;
        if let Some(mut previous) = self.lock.take() {
            previous.stop();
        }

        let poller = LockPoller::spawn(api, self.document.id.clone(), self.config.lock_poll_interval());
        let rx = poller.subscribe();
        self.lock = Some(poller);
        Ok(rx)
    }

    /// Last known lock status; `None` when not polling
    pub fn lock_status(&self) -> Option<LockStatus> {
        self.lock.as_ref().map(LockPoller::status)
    }

    pub fn is_polling_lock(&self) -> bool {
        self.lock.as_ref().is_some_and(LockPoller::is_running)
    }
}

/// Settles a ticket if the future awaiting its response is dropped first
struct InFlight<'a> {
    session: &'a mut EditorSession,
    ticket: SaveTicket,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn new(session: &'a mut EditorSession, ticket: SaveTicket) -> Self {
        Self {
            session,
            ticket,
            finished: false,
        }
    }

    fn finish(mut self, f: impl FnOnce(&mut EditorSession, SaveTicket) -> SaveOutcome) -> SaveOutcome {
        self.finished = true;
        f(&mut *self.session, self.ticket)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.session.abandon_request_at(self.ticket, Instant::now());
        }
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.close();
    }
}

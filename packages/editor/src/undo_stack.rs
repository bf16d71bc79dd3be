//! # Undo/Redo Stack
//!
//! Bounded, linear snapshot history of the block sequence.
//!
//! ## Design
//!
//! - The stack holds immutable [`Snapshot`]s of the blocks (metadata is not
//!   tracked) plus a pointer to the entry that matches the live blocks
//! - Every recorded change pushes the post-change snapshot; the pre-change
//!   state is the entry below it, so undo restores it exactly
//! - Continuous edits pushed within the debounce window of the previous
//!   continuous push replace the top entry instead of adding one
//! - Recording after an undo discards the redo branch
//! - Beyond `max_levels` entries the oldest is evicted
//!
//! ```text
//!   [s0] [s1] [s2] [s3]        record(s4)     [s1] [s2] [s3] [s4]
//!                   ^ pointer   (max 4)                        ^
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! stack.reset(doc.blocks())?;
//!
//! doc.apply(command);
//! stack.record(doc.blocks(), CommandKind::Discrete)?;
//!
//! if let Some(blocks) = stack.undo() {
//!     doc.replace_blocks(blocks);
//! }
//! ```

use crate::errors::SnapshotError;
use pagecraft_model::{check_blocks, Block, CommandKind};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_MAX_LEVELS: usize = 50;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Immutable copy of a block sequence, never shared with the live document
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    blocks: Arc<[Block]>,
}

impl Snapshot {
    /// Deep-copy `blocks`, refusing sequences that break block invariants
    pub fn capture(blocks: &[Block]) -> Result<Self, SnapshotError> {
        check_blocks(blocks)?;
        Ok(Self {
            blocks: blocks.to_vec().into(),
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Fresh owned copy for the live document
    pub fn to_vec(&self) -> Vec<Block> {
        self.blocks.to_vec()
    }
}

/// What [`UndoStack::record_at`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Pushed,
    Coalesced,
}

/// Undo/redo stack for the block sequence
#[derive(Debug)]
pub struct UndoStack {
    entries: VecDeque<Snapshot>,

    /// Index of the entry matching the live blocks
    pointer: usize,

    /// Maximum number of entries (at least 1)
    max_levels: usize,

    /// Quiet period that separates continuous-edit undo steps
    debounce: Duration,

    /// When and by what kind of change the last entry was pushed
    last_push: Option<(Instant, CommandKind)>,
}

impl UndoStack {
    /// Create an undo stack with default limits (50 levels, 500ms debounce)
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_LEVELS, DEFAULT_DEBOUNCE)
    }

    pub fn with_limits(max_levels: usize, debounce: Duration) -> Self {
        Self {
            entries: VecDeque::new(),
            pointer: 0,
            max_levels: max_levels.max(1),
            debounce,
            last_push: None,
        }
    }

    /// Drop all history and start from `blocks`
    pub fn reset(&mut self, blocks: &[Block]) -> Result<(), SnapshotError> {
        self.clear();
        let snapshot = Snapshot::capture(blocks)?;
        self.entries.push_back(snapshot);
        Ok(())
    }

    /// Record the post-change blocks of a command
    pub fn record(&mut self, blocks: &[Block], kind: CommandKind) -> Result<Recorded, SnapshotError> {
        self.record_at(blocks, kind, Instant::now())
    }

    pub fn record_at(
        &mut self,
        blocks: &[Block],
        kind: CommandKind,
        now: Instant,
    ) -> Result<Recorded, SnapshotError> {
        let snapshot = Snapshot::capture(blocks)?;

        if self.should_coalesce(kind, now) {
            if let Some(top) = self.entries.back_mut() {
                *top = snapshot;
                return Ok(Recorded::Coalesced);
            }
        }

        // New action invalidates the redo branch
        self.entries.truncate(self.pointer + 1);
        self.entries.push_back(snapshot);
        self.last_push = Some((now, kind));

        while self.entries.len() > self.max_levels {
            self.entries.pop_front();
        }
        self.pointer = self.entries.len() - 1;

        Ok(Recorded::Pushed)
    }

    fn should_coalesce(&self, kind: CommandKind, now: Instant) -> bool {
        if kind != CommandKind::Continuous || !self.at_top() {
            return false;
        }

        match self.last_push {
            Some((at, CommandKind::Continuous)) => now.saturating_duration_since(at) < self.debounce,
            _ => false,
        }
    }

    fn at_top(&self) -> bool {
        self.pointer + 1 == self.entries.len()
    }

    /// Step back; returns the blocks to restore
    pub fn undo(&mut self) -> Option<Vec<Block>> {
        if self.pointer == 0 || self.entries.is_empty() {
            return None;
        }

        self.pointer -= 1;
        self.last_push = None;
        self.entries.get(self.pointer).map(Snapshot::to_vec)
    }

    /// Step forward; returns the blocks to restore
    pub fn redo(&mut self) -> Option<Vec<Block>> {
        if self.pointer + 1 >= self.entries.len() {
            return None;
        }

        self.pointer += 1;
        self.last_push = None;
        self.entries.get(self.pointer).map(Snapshot::to_vec)
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.entries.len()
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Snapshot matching the live blocks
    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.pointer)
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pointer = 0;
        self.last_push = None;
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::{BlockType, Command, Document};
    use serde_json::json;

    fn doc() -> Document {
        let mut doc = Document::new("history-test");
        doc.apply(Command::AddBlock {
            block_type: BlockType::Text,
            after_index: None,
        });
        doc
    }

    fn type_text(doc: &mut Document, text: &str) {
        let id = doc.blocks()[0].id.clone();
        doc.apply(Command::UpdateBlock {
            id,
            data: json!({ "contents": text }).as_object().unwrap().clone(),
        });
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.len(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_record_and_undo_restores_previous_blocks() {
        let mut doc = doc();
        let mut stack = UndoStack::new();
        stack.reset(doc.blocks()).unwrap();
        let before = doc.blocks().to_vec();

        doc.apply(Command::AddBlock {
            block_type: BlockType::Faq,
            after_index: None,
        });
        stack.record(doc.blocks(), CommandKind::Discrete).unwrap();
        let after = doc.blocks().to_vec();

        let undone = stack.undo().unwrap();
        assert_eq!(undone, before);
        assert!(stack.can_redo());

        let redone = stack.redo().unwrap();
        assert_eq!(redone, after);
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_at_bottom_is_noop() {
        let mut stack = UndoStack::new();
        stack.reset(doc().blocks()).unwrap();

        assert!(stack.undo().is_none());
        assert!(stack.redo().is_none());
    }

    #[test]
    fn test_snapshot_is_not_aliased_with_live_blocks() {
        let mut doc = doc();
        let mut stack = UndoStack::new();
        stack.reset(doc.blocks()).unwrap();
        let captured = stack.current().unwrap().clone();

        type_text(&mut doc, "changed");

        assert_ne!(captured.blocks(), doc.blocks());
        assert_eq!(stack.current().unwrap(), &captured);
    }

    #[test]
    fn test_new_record_clears_redo() {
        let mut doc = doc();
        let mut stack = UndoStack::new();
        stack.reset(doc.blocks()).unwrap();
        let t0 = Instant::now();

        doc.apply(Command::AddBlock {
            block_type: BlockType::Faq,
            after_index: None,
        });
        stack.record_at(doc.blocks(), CommandKind::Discrete, t0).unwrap();
        let restored = stack.undo().unwrap();
        doc.replace_blocks(restored);
        assert!(stack.can_redo());

        doc.apply(Command::AddBlock {
            block_type: BlockType::Image,
            after_index: None,
        });
        stack
            .record_at(doc.blocks(), CommandKind::Discrete, t0 + Duration::from_secs(1))
            .unwrap();

        assert!(!stack.can_redo());
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = doc();
        let mut stack = UndoStack::new();
        stack.reset(doc.blocks()).unwrap();
        let t0 = Instant::now();

        let mut first_recorded = None;
        for i in 0..DEFAULT_MAX_LEVELS {
            doc.apply(Command::AddBlock {
                block_type: BlockType::Text,
                after_index: None,
            });
            stack
                .record_at(doc.blocks(), CommandKind::Discrete, t0 + Duration::from_secs(i as u64))
                .unwrap();
            if i == 0 {
                first_recorded = Some(doc.blocks().to_vec());
            }
        }

        // Baseline + 50 pushes: the baseline was evicted
        assert_eq!(stack.len(), DEFAULT_MAX_LEVELS);
        assert_eq!(stack.pointer(), DEFAULT_MAX_LEVELS - 1);

        let mut oldest = None;
        while let Some(blocks) = stack.undo() {
            oldest = Some(blocks);
        }
        assert_eq!(oldest, first_recorded);
    }

    #[test]
    fn test_continuous_burst_coalesces() {
        let mut doc = doc();
        let mut stack = UndoStack::new();
        stack.reset(doc.blocks()).unwrap();
        let t0 = Instant::now();

        // 29 keystrokes within 400ms
        for i in 0..29u64 {
            type_text(&mut doc, &format!("draft {}", i));
            stack
                .record_at(doc.blocks(), CommandKind::Continuous, t0 + Duration::from_millis(i * 14))
                .unwrap();
        }

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.current().unwrap().blocks(), doc.blocks());
    }

    #[test]
    fn test_pause_starts_new_continuous_step() {
        let mut doc = doc();
        let mut stack = UndoStack::new();
        stack.reset(doc.blocks()).unwrap();
        let t0 = Instant::now();

        type_text(&mut doc, "first");
        stack.record_at(doc.blocks(), CommandKind::Continuous, t0).unwrap();

        type_text(&mut doc, "second");
        let recorded = stack
            .record_at(doc.blocks(), CommandKind::Continuous, t0 + Duration::from_millis(500))
            .unwrap();

        assert_eq!(recorded, Recorded::Pushed);
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn test_continuous_after_undo_does_not_overwrite_history() {
        let mut doc = doc();
        let mut stack = UndoStack::new();
        stack.reset(doc.blocks()).unwrap();
        let t0 = Instant::now();

        type_text(&mut doc, "one");
        stack.record_at(doc.blocks(), CommandKind::Continuous, t0).unwrap();
        let restored = stack.undo().unwrap();
        doc.replace_blocks(restored);

        type_text(&mut doc, "two");
        let recorded = stack
            .record_at(doc.blocks(), CommandKind::Continuous, t0 + Duration::from_millis(10))
            .unwrap();

        assert_eq!(recorded, Recorded::Pushed);
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_inconsistent_blocks_are_not_captured() {
        let mut doc = doc();
        let mut stack = UndoStack::new();
        stack.reset(doc.blocks()).unwrap();

        let mut broken = doc.blocks().to_vec();
        broken[0].order = 7;

        assert!(stack.record(&broken, CommandKind::Discrete).is_err());
        assert_eq!(stack.len(), 1);

        // Live document untouched by the failed capture
        type_text(&mut doc, "still editable");
        assert!(stack.record(doc.blocks(), CommandKind::Discrete).is_ok());
    }
}

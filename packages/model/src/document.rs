//! # Page Document
//!
//! A [`Document`] is an ordered block sequence plus page metadata and the
//! workflow status.
//!
//! ## Invariants
//!
//! - `blocks[i].order == i` for every block, after every operation
//! - block ids are unique within the document and never change
//! - `scheduled_at` is set only while `status == Scheduled`
//!
//! All block operations are total: an id that does not exist turns the
//! operation into a no-op.

use crate::block::{Block, BlockType};
use crate::command::{Applied, Command, Direction};
use crate::error::{InvariantError, ModelError};
use crate::id_generator::IdGenerator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Publish-lifecycle state of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Draft,
    InReview,
    Approved,
    Scheduled,
    Published,
}

impl WorkflowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStatus::Draft => "draft",
            WorkflowStatus::InReview => "in_review",
            WorkflowStatus::Approved => "approved",
            WorkflowStatus::Scheduled => "scheduled",
            WorkflowStatus::Published => "published",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(WorkflowStatus::Draft),
            "in_review" => Ok(WorkflowStatus::InReview),
            "approved" => Ok(WorkflowStatus::Approved),
            "scheduled" => Ok(WorkflowStatus::Scheduled),
            "published" => Ok(WorkflowStatus::Published),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

/// Page-level text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetaField {
    Title,
    Slug,
    MetaTitle,
    MetaDescription,
    PrimaryKeyword,
    HeroImage,
    HeroImageAlt,
}

/// Editable page document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    blocks: Vec<Block>,
    pub title: String,
    pub slug: String,
    pub meta_title: String,
    pub meta_description: String,
    pub primary_keyword: String,
    pub hero_image: String,
    pub hero_image_alt: String,
    pub status: WorkflowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    ids: IdGenerator,
}

impl Document {
    /// Create an empty draft
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            ids: IdGenerator::new(&id),
            id,
            ..Default::default()
        }
    }

    /// Parse a document from its JSON wire form. Block order is renumbered
    /// and duplicate or empty block ids are replaced.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut doc: Document = serde_json::from_str(json)?;
        doc.normalize();
        Ok(doc)
    }

    /// Blocks in display order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Apply a command and return the new block sequence
    pub fn apply(&mut self, command: Command) -> &[Block] {
        self.execute(command);
        &self.blocks
    }

    /// Apply a command and report what it did
    pub fn execute(&mut self, command: Command) -> Applied {
        let name = command.name();
        let applied = match command {
            Command::AddBlock {
                block_type,
                after_index,
            } => self.add_block(block_type, after_index),
            Command::RemoveBlock { id } => self.remove_block(&id),
            Command::UpdateBlock { id, data } => self.update_block(&id, &data),
            Command::DuplicateBlock { id } => self.duplicate_block(&id),
            Command::MoveBlock { id, direction } => self.move_block(&id, direction),
            Command::Reorder { ids } => self.reorder(&ids),
        };

        debug!(command = name, changed = applied.changed, blocks = self.blocks.len(), "Applied command");
        applied
    }

    fn add_block(&mut self, block_type: BlockType, after_index: Option<usize>) -> Applied {
        let id = self.fresh_block_id();
        let position = match after_index {
            Some(index) => index.saturating_add(1).min(self.blocks.len()),
            None => self.blocks.len(),
        };

        self.blocks
            .insert(position, Block::with_defaults(id.clone(), block_type, position));
        self.normalize_order();
        Applied::inserted(id)
    }

    fn remove_block(&mut self, id: &str) -> Applied {
        let Some(index) = self.position(id) else {
            debug!(block_id = %id, "Remove of unknown block ignored");
            return Applied::unchanged();
        };

        self.blocks.remove(index);
        self.normalize_order();
        Applied::changed()
    }

    fn update_block(&mut self, id: &str, partial: &Map<String, Value>) -> Applied {
        let Some(index) = self.position(id) else {
            debug!(block_id = %id, "Update of unknown block ignored");
            return Applied::unchanged();
        };

        match self.blocks[index].data.merge_json(partial) {
            Ok(true) => Applied::changed(),
            Ok(false) => Applied::unchanged(),
            Err(e) => {
                warn!(block_id = %id, error = %e, "Update does not fit block payload, ignored");
                Applied::unchanged()
            }
        }
    }

    fn duplicate_block(&mut self, id: &str) -> Applied {
        let Some(index) = self.position(id) else {
            debug!(block_id = %id, "Duplicate of unknown block ignored");
            return Applied::unchanged();
        };

        let new_id = self.fresh_block_id();
        let copy = Block::new(new_id.clone(), self.blocks[index].data.clone(), index + 1);
        self.blocks.insert(index + 1, copy);
        self.normalize_order();
        Applied::inserted(new_id)
    }

    fn move_block(&mut self, id: &str, direction: Direction) -> Applied {
        let Some(index) = self.position(id) else {
            debug!(block_id = %id, "Move of unknown block ignored");
            return Applied::unchanged();
        };

        let target = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.blocks.len() => index + 1,
            _ => return Applied::unchanged(),
        };

        self.blocks.swap(index, target);
        self.normalize_order();
        Applied::changed()
    }

    /// Rearrange blocks into `ids` order.
    ///
    /// Unknown and repeated ids are ignored; blocks missing from `ids` keep
    /// their relative order after the listed ones.
    fn reorder(&mut self, ids: &[String]) -> Applied {
        let before: Vec<String> = self.blocks.iter().map(|b| b.id.clone()).collect();

        let mut remaining: HashMap<String, Block> = self
            .blocks
            .drain(..)
            .map(|block| (block.id.clone(), block))
            .collect();

        let mut reordered = Vec::with_capacity(before.len());
        for id in ids {
            if let Some(block) = remaining.remove(id) {
                reordered.push(block);
            }
        }
        for id in &before {
            if let Some(block) = remaining.remove(id) {
                reordered.push(block);
            }
        }

        self.blocks = reordered;
        self.normalize_order();

        let changed = self.blocks.iter().map(|b| b.id.as_str()).ne(before.iter().map(String::as_str));
        if changed {
            Applied::changed()
        } else {
            Applied::unchanged()
        }
    }

    /// Replace the whole block sequence (undo/redo, version restore).
    /// Order is renumbered and clashing ids are replaced.
    pub fn replace_blocks(&mut self, blocks: Vec<Block>) {
        self.blocks = blocks;
        self.normalize();
    }

    /// Restore the block invariants on a document that did not come from
    /// [`Document::apply`]; returns the number of replaced ids
    pub fn normalize(&mut self) -> usize {
        self.normalize_order();
        self.repair_block_ids()
    }

    /// Give every block with an empty or already used id a fresh one; returns
    /// how many were replaced. The first occurrence of an id keeps it.
    pub fn repair_block_ids(&mut self) -> usize {
        let mut seen = HashSet::with_capacity(self.blocks.len());
        let mut repaired = 0;

        for index in 0..self.blocks.len() {
            let id = self.blocks[index].id.clone();
            if !id.is_empty() && seen.insert(id.clone()) {
                continue;
            }

            let fresh = self.fresh_block_id();
            warn!(block_id = %id, new_id = %fresh, "Replaced clashing block id");
            seen.insert(fresh.clone());
            self.blocks[index].id = fresh;
            repaired += 1;
        }

        repaired
    }

    /// Set a metadata field; returns whether the value changed
    pub fn set_meta(&mut self, field: MetaField, value: impl Into<String>) -> bool {
        let value = value.into();
        let slot = match field {
            MetaField::Title => &mut self.title,
            MetaField::Slug => &mut self.slug,
            MetaField::MetaTitle => &mut self.meta_title,
            MetaField::MetaDescription => &mut self.meta_description,
            MetaField::PrimaryKeyword => &mut self.primary_keyword,
            MetaField::HeroImage => &mut self.hero_image,
            MetaField::HeroImageAlt => &mut self.hero_image_alt,
        };

        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    /// Recompute `order` from array position
    fn normalize_order(&mut self) {
        for (index, block) in self.blocks.iter_mut().enumerate() {
            block.order = index;
        }
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Verify block and workflow invariants
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        check_blocks(&self.blocks)?;

        match (self.status, self.scheduled_at) {
            (WorkflowStatus::Scheduled, None) => Err(InvariantError::MissingSchedule),
            (WorkflowStatus::Scheduled, Some(_)) | (_, None) => Ok(()),
            (status, Some(_)) => Err(InvariantError::UnexpectedSchedule(status.to_string())),
        }
    }

    fn fresh_block_id(&mut self) -> String {
        self.ids.ensure_seeded(&self.id);
        let blocks = &self.blocks;
        self.ids.next_free(|candidate| blocks.iter().any(|b| b.id == candidate))
    }
}

/// Verify that `order` is a dense permutation matching position and that
/// ids are unique and non-empty
pub fn check_blocks(blocks: &[Block]) -> Result<(), InvariantError> {
    let mut seen = HashSet::with_capacity(blocks.len());

    for (index, block) in blocks.iter().enumerate() {
        if block.order != index {
            return Err(InvariantError::OrderMismatch {
                index,
                order: block.order,
            });
        }
        if block.id.is_empty() {
            return Err(InvariantError::EmptyId(index));
        }
        if !seen.insert(block.id.as_str()) {
            return Err(InvariantError::DuplicateId(block.id.clone()));
        }
    }

    Ok(())
}

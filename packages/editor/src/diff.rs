//! Display-only comparison between the live page and a stored version.

use crate::backend::Version;
use pagecraft_model::{Block, BlockType, Document};
use serde::Serialize;
use std::collections::HashMap;

/// The parts of a page a version records
#[derive(Debug, Clone, Copy)]
pub struct DiffSide<'a> {
    pub title: &'a str,
    pub meta_description: &'a str,
    pub blocks: &'a [Block],
}

impl<'a> From<&'a Document> for DiffSide<'a> {
    fn from(doc: &'a Document) -> Self {
        Self {
            title: &doc.title,
            meta_description: &doc.meta_description,
            blocks: doc.blocks(),
        }
    }
}

impl<'a> From<&'a Version> for DiffSide<'a> {
    fn from(version: &'a Version) -> Self {
        Self {
            title: &version.title,
            meta_description: &version.meta_description,
            blocks: &version.blocks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: &'static str,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockChange {
    Added {
        id: String,
        block_type: BlockType,
        index: usize,
    },
    Removed {
        id: String,
        block_type: BlockType,
        index: usize,
    },
    Modified {
        id: String,
        block_type: BlockType,
    },
    Moved {
        id: String,
        from: usize,
        to: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionDiff {
    pub fields: Vec<FieldChange>,
    pub blocks: Vec<BlockChange>,
}

impl VersionDiff {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.blocks.is_empty()
    }
}

/// Changes that turn `previous` into `current`.
///
/// A block counts as moved only when its position relative to the other
/// surviving blocks changed, so an insertion does not mark every later
/// block as moved.
pub fn diff<'a, 'b>(current: impl Into<DiffSide<'a>>, previous: impl Into<DiffSide<'b>>) -> VersionDiff {
    let current = current.into();
    let previous = previous.into();
    let mut result = VersionDiff::default();

    for (field, before, after) in [
        ("title", previous.title, current.title),
        ("metaDescription", previous.meta_description, current.meta_description),
    ] {
        if before != after {
            result.fields.push(FieldChange {
                field,
                before: before.to_string(),
                after: after.to_string(),
            });
        }
    }

    let previous_by_id: HashMap<&str, &Block> =
        previous.blocks.iter().map(|b| (b.id.as_str(), b)).collect();
    let current_by_id: HashMap<&str, &Block> =
        current.blocks.iter().map(|b| (b.id.as_str(), b)).collect();

    for (index, block) in previous.blocks.iter().enumerate() {
        if !current_by_id.contains_key(block.id.as_str()) {
            result.blocks.push(BlockChange::Removed {
                id: block.id.clone(),
                block_type: block.block_type(),
                index,
            });
        }
    }

    for (index, block) in current.blocks.iter().enumerate() {
        match previous_by_id.get(block.id.as_str()) {
            None => result.blocks.push(BlockChange::Added {
                id: block.id.clone(),
                block_type: block.block_type(),
                index,
            }),
            Some(old) if old.data != block.data => result.blocks.push(BlockChange::Modified {
                id: block.id.clone(),
                block_type: block.block_type(),
            }),
            Some(_) => {}
        }
    }

    // Relative positions among blocks present on both sides
    let kept_before: Vec<&str> = previous
        .blocks
        .iter()
        .map(|b| b.id.as_str())
        .filter(|id| current_by_id.contains_key(id))
        .collect();
    let kept_after: Vec<&str> = current
        .blocks
        .iter()
        .map(|b| b.id.as_str())
        .filter(|id| previous_by_id.contains_key(id))
        .collect();
    let before_rank: HashMap<&str, usize> =
        kept_before.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    for (to, id) in kept_after.iter().enumerate() {
        if let Some(&from) = before_rank.get(id) {
            if from != to {
                result.blocks.push(BlockChange::Moved {
                    id: id.to_string(),
                    from,
                    to,
                });
            }
        }
    }

    result
}

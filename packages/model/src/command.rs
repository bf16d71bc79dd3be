//! # Block Commands
//!
//! Every change to the block sequence is reified as a [`Command`] value and
//! applied through [`Document::apply`](crate::Document::apply).
//!
//! ## Command Semantics
//!
//! ### Discrete vs. continuous
//! - Structural commands (add, remove, duplicate, move, reorder) are
//!   discrete: each one is its own undo step
//! - `UpdateBlock` is continuous: free-text edits arrive once per keystroke
//!   and are coalesced by the history
//!
//! ### Missing blocks
//! - A command naming a block id that does not exist is a no-op
//! - No command ever fails; every command is total over the block sequence

use crate::block::BlockType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Direction for [`Command::MoveBlock`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Block sequence mutations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Command {
    /// Insert a block with the type's default payload after `after_index`
    /// (or append when absent)
    AddBlock {
        block_type: BlockType,
        #[serde(default)]
        after_index: Option<usize>,
    },

    /// Delete a block
    RemoveBlock { id: String },

    /// Shallow-merge `data` into a block's payload
    UpdateBlock { id: String, data: Map<String, Value> },

    /// Clone a block (with a new id) directly after the source
    DuplicateBlock { id: String },

    /// Swap a block with its neighbour
    MoveBlock { id: String, direction: Direction },

    /// Apply a drag-and-drop permutation
    Reorder { ids: Vec<String> },
}

/// How the history should treat a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Discrete,
    Continuous,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::UpdateBlock { .. } => CommandKind::Continuous,
            _ => CommandKind::Discrete,
        }
    }

    /// Debug name
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddBlock { .. } => "add_block",
            Command::RemoveBlock { .. } => "remove_block",
            Command::UpdateBlock { .. } => "update_block",
            Command::DuplicateBlock { .. } => "duplicate_block",
            Command::MoveBlock { .. } => "move_block",
            Command::Reorder { .. } => "reorder",
        }
    }

    /// Block the command targets, if it names one
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Command::RemoveBlock { id }
            | Command::UpdateBlock { id, .. }
            | Command::DuplicateBlock { id }
            | Command::MoveBlock { id, .. } => Some(id),
            Command::AddBlock { .. } | Command::Reorder { .. } => None,
        }
    }
}

/// What applying a command did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    /// Whether the block sequence changed at all
    pub changed: bool,

    /// Id of a block created by add/duplicate
    pub inserted_id: Option<String>,
}

impl Applied {
    pub(crate) fn unchanged() -> Self {
        Self::default()
    }

    pub(crate) fn changed() -> Self {
        Self {
            changed: true,
            inserted_id: None,
        }
    }

    pub(crate) fn inserted(id: String) -> Self {
        Self {
            changed: true,
            inserted_id: Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_serialization() {
        let command = Command::MoveBlock {
            id: "b-1".to_string(),
            direction: Direction::Down,
        };

        let json = serde_json::to_string(&command).unwrap();
        let deserialized: Command = serde_json::from_str(&json).unwrap();

        assert_eq!(command, deserialized);
    }

    #[test]
    fn test_add_block_after_index_is_optional() {
        let command: Command =
            serde_json::from_value(json!({ "AddBlock": { "block_type": "faq" } })).unwrap();

        assert_eq!(
            command,
            Command::AddBlock {
                block_type: BlockType::Faq,
                after_index: None,
            }
        );
    }

    #[test]
    fn test_only_updates_are_continuous() {
        let update = Command::UpdateBlock {
            id: "b-1".to_string(),
            data: Map::new(),
        };
        let remove = Command::RemoveBlock {
            id: "b-1".to_string(),
        };

        assert_eq!(update.kind(), CommandKind::Continuous);
        assert_eq!(remove.kind(), CommandKind::Discrete);
        assert_eq!(update.target_id(), Some("b-1"));
    }
}

//! Error types for the editor

use crate::workflow::WorkflowError;
use pagecraft_model::{BlockType, InvariantError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("{0}")]
    Workflow(#[from] WorkflowError),

    #[error("Service error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Block {id} is a {block_type} block and cannot be generated")]
    NotGeneratable { id: String, block_type: BlockType },

    #[error("Editor session is closed")]
    SessionClosed,
}

/// Failure of a call to an external service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected: {0}")]
    Rejected(String),
}

/// A block sequence that could not be captured for history
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Block sequence is inconsistent: {0}")]
    Inconsistent(#[from] InvariantError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

//! Error types for the document model

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),

    #[error("Invalid payload for block {block_id}: {message}")]
    InvalidPayload { block_id: String, message: String },

    #[error("Unknown workflow status: {0}")]
    UnknownStatus(String),
}

/// A violated block-sequence or document invariant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("Block at index {index} has order {order}")]
    OrderMismatch { index: usize, order: usize },

    #[error("Duplicate block id: {0}")]
    DuplicateId(String),

    #[error("Block at index {0} has an empty id")]
    EmptyId(usize),

    #[error("scheduledAt is set but status is {0}")]
    UnexpectedSchedule(String),

    #[error("Status is scheduled but scheduledAt is missing")]
    MissingSchedule,
}

//! # Pagecraft Editor
//!
//! Editing core for Pagecraft pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Document + Commands                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditorSession                       │
//! │  - Undo/redo snapshots of the blocks        │
//! │  - Debounced autosave with sequence guard   │
//! │  - Publish workflow gated by SEO            │
//! │  - Versions, lock polling, AI sections      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ backend: persistence, versions, lock, AI    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Document is source of truth**: the SEO score and diffs are derived views
//! 2. **Commands only**: every block change is a [`Command`] applied by the session
//! 3. **Failures stay local**: nothing here corrupts the in-memory document
//! 4. **Advisory lock**: concurrent editors are reported, never blocked
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::{EditorConfig, EditorSession, MockBackend};
//! use pagecraft_model::{BlockType, Command, Document};
//!
//! let backend = MockBackend::new();
//! let mut session = EditorSession::open(Document::new("lisbon-guide"), EditorConfig::default());
//!
//! session.apply(Command::AddBlock { block_type: BlockType::Hero, after_index: None })?;
//! session.undo()?;
//!
//! session.save(&backend).await?;
//! session.close();
//! ```

pub mod autosave;
pub mod backend;
pub mod config;
pub mod diff;
pub mod errors;
pub mod lock;
pub mod mock;
pub mod session;
pub mod undo_stack;
pub mod workflow;

pub use autosave::{AutosaveScheduler, AutosaveState};
pub use backend::{
    AdapterResult, LockApi, LockStatus, PersistenceApi, SavePayload, SectionGenerator,
    SectionKind, Version, VersionStore,
};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use diff::{diff, BlockChange, DiffSide, FieldChange, VersionDiff};
pub use errors::{AdapterError, ConfigError, EditorError, SnapshotError};
pub use lock::LockPoller;
pub use mock::MockBackend;
pub use session::{EditorSession, PublishRequest, SaveOrigin, SaveOutcome, SaveRequest, SaveTicket};
pub use undo_stack::{Recorded, Snapshot, UndoStack};
pub use workflow::{WorkflowAction, WorkflowError};

pub use pagecraft_model::{Block, BlockType, Command, CommandKind, Document, MetaField, WorkflowStatus};

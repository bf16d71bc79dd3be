//! # Pagecraft Model
//!
//! Block-document data model for the Pagecraft page editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: blocks + page metadata + commands    │
//! └─────────────────────────────────────────────┘
//!            ↓                        ↓
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ seo: derived score   │  │ editor: history,     │
//! │ (pure projection)    │  │ autosave, workflow   │
//! └──────────────────────┘  └──────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use pagecraft_model::{BlockType, Command, Document};
//!
//! let mut doc = Document::new("lisbon-guide");
//! doc.apply(Command::AddBlock { block_type: BlockType::Hero, after_index: None });
//! doc.apply(Command::AddBlock { block_type: BlockType::Text, after_index: None });
//!
//! assert_eq!(doc.blocks()[1].order, 1);
//! ```

mod block;
mod command;
mod document;
mod error;
mod id_generator;
mod text;

pub use block::{
    Block, BlockData, BlockType, ButtonData, CodeData, CtaData, DividerData, EmbedData,
    FaqData, GalleryData, GalleryImage, HeadingData, HeroData, HighlightsData, ImageData,
    InfoBoxData, ListData, MapData, QuoteData, TableData, TestimonialData, TextData, TipsData,
    VideoData,
};
pub use command::{Applied, Command, CommandKind, Direction};
pub use document::{check_blocks, Document, MetaField, WorkflowStatus};
pub use error::{InvariantError, ModelError};
pub use id_generator::{get_document_seed, IdGenerator};
pub use text::{block_text, content_text, reading_time_minutes, word_count};

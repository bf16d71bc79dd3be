//! # External Services
//!
//! Contracts with the services the editor talks to. The editor only consumes
//! these; implementations live with the transport (see [`crate::MockBackend`]
//! for the in-memory one used in tests and tools).

use crate::errors::AdapterError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagecraft_model::{Block, BlockType, Document, WorkflowStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type AdapterResult<T> = Result<T, AdapterError>;

/// Partial document sent on every save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    pub blocks: Vec<Block>,
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

    // Derived from blocks
    pub content_text: String,
    pub word_count: usize,
    pub reading_time_minutes: usize,

    /// Local edit sequence this payload was captured at
    pub edit_seq: u64,
}

impl SavePayload {
    pub fn capture(doc: &Document, edit_seq: u64) -> Self {
        let word_count = pagecraft_model::word_count(doc.blocks());
        Self {
            blocks: doc.blocks().to_vec(),
            title: doc.title.clone(),
            slug: doc.slug.clone(),
            meta_title: doc.meta_title.clone(),
            meta_description: doc.meta_description.clone(),
            primary_keyword: doc.primary_keyword.clone(),
            hero_image: doc.hero_image.clone(),
            hero_image_alt: doc.hero_image_alt.clone(),
            status: doc.status,
            scheduled_at: doc.scheduled_at,
            content_text: pagecraft_model::content_text(doc.blocks()),
            word_count,
            reading_time_minutes: pagecraft_model::reading_time_minutes(word_count),
            edit_seq,
        }
    }

    /// Apply the payload on top of a stored document
    pub fn apply_to(&self, doc: &mut Document) {
        doc.replace_blocks(self.blocks.clone());
        doc.title = self.title.clone();
        doc.slug = self.slug.clone();
        doc.meta_title = self.meta_title.clone();
        doc.meta_description = self.meta_description.clone();
        doc.primary_keyword = self.primary_keyword.clone();
        doc.hero_image = self.hero_image.clone();
        doc.hero_image_alt = self.hero_image_alt.clone();
        doc.status = self.status;
        doc.scheduled_at = self.scheduled_at;
    }
}

/// Server-created record of a past persisted state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: String,
    pub version_number: u64,
    pub blocks: Vec<Block>,
    pub title: String,
    pub meta_description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_note: Option<String>,
}

/// Advisory concurrent-editor status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockStatus {
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,
}

/// Sections the generation service can fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Faq,
    Tips,
    Highlights,
}

impl SectionKind {
    pub fn for_block_type(block_type: BlockType) -> Option<Self> {
        match block_type {
            BlockType::Faq => Some(SectionKind::Faq),
            BlockType::Tips => Some(SectionKind::Tips),
            BlockType::Highlights => Some(SectionKind::Highlights),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Faq => "faq",
            SectionKind::Tips => "tips",
            SectionKind::Highlights => "highlights",
        }
    }
}

#[async_trait]
pub trait PersistenceApi: Send + Sync {
    async fn save(&self, document_id: &str, payload: SavePayload) -> AdapterResult<Document>;

    async fn publish(&self, document_id: &str, document: Document) -> AdapterResult<Document>;
}

#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Versions of a document, newest first
    async fn list_versions(&self, document_id: &str) -> AdapterResult<Vec<Version>>;

    async fn restore_version(&self, document_id: &str, version_id: &str) -> AdapterResult<Document>;
}

#[async_trait]
pub trait LockApi: Send + Sync {
    async fn get_lock_status(&self, document_id: &str) -> AdapterResult<LockStatus>;
}

#[async_trait]
pub trait SectionGenerator: Send + Sync {
    /// Returns a payload that is merged verbatim into the block's data
    async fn generate_section(
        &self,
        kind: SectionKind,
        title: &str,
        existing_content: &str,
    ) -> AdapterResult<Map<String, Value>>;
}

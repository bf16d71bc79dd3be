use crate::backend::{
    AdapterResult, LockApi, LockStatus, PersistenceApi, SavePayload, SectionGenerator,
    SectionKind, Version, VersionStore,
};
use crate::errors::AdapterError;
use async_trait::async_trait;
use chrono::Utc;
use pagecraft_model::Document;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockState {
    documents: HashMap<String, Document>,
    versions: HashMap<String, Vec<Version>>,
    locks: HashMap<String, LockStatus>,
    sections: HashMap<SectionKind, Map<String, Value>>,
    fail_saves: bool,
    fail_lock_polls: bool,
    saves: usize,
    publishes: usize,
    lock_polls: usize,
}

/// In-memory implementation of every external service.
///
/// Clones share state, so a test can hand one clone to the session and keep
/// another to inspect or script the backend.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a document as if it had been persisted before
    pub fn insert_document(&self, document: Document) {
        self.state().documents.insert(document.id.clone(), document);
    }

    pub fn document(&self, document_id: &str) -> Option<Document> {
        self.state().documents.get(document_id).cloned()
    }

    pub fn set_lock(&self, document_id: &str, locked_by: Option<&str>) {
        let status = LockStatus {
            is_locked: locked_by.is_some(),
            locked_by: locked_by.map(str::to_string),
        };
        self.state().locks.insert(document_id.to_string(), status);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.state().fail_saves = fail;
    }

    pub fn set_fail_lock_polls(&self, fail: bool) {
        self.state().fail_lock_polls = fail;
    }

    /// Script the payload returned for a section kind
    pub fn set_section(&self, kind: SectionKind, payload: Map<String, Value>) {
        self.state().sections.insert(kind, payload);
    }

    pub fn saves(&self) -> usize {
        self.state().saves
    }

    pub fn publishes(&self) -> usize {
        self.state().publishes
    }

    pub fn lock_polls(&self) -> usize {
        self.state().lock_polls
    }

    pub fn version_count(&self, document_id: &str) -> usize {
        self.state().versions.get(document_id).map_or(0, Vec::len)
    }
}

impl MockState {
    fn record_version(&mut self, document: &Document, change_note: Option<String>) {
        let versions = self.versions.entry(document.id.clone()).or_default();
        let version_number = versions.len() as u64 + 1;
        versions.push(Version {
            id: format!("{}-v{}", document.id, version_number),
            version_number,
            blocks: document.blocks().to_vec(),
            title: document.title.clone(),
            meta_description: document.meta_description.clone(),
            created_at: Utc::now(),
            change_note,
        });
    }
}

#[async_trait]
impl PersistenceApi for MockBackend {
    async fn save(&self, document_id: &str, payload: SavePayload) -> AdapterResult<Document> {
        let mut state = self.state();
        state.saves += 1;

        if state.fail_saves {
            return Err(AdapterError::Transport("save unavailable".to_string()));
        }

        let mut document = state
            .documents
            .get(document_id)
            .cloned()
            .unwrap_or_else(|| Document::new(document_id));
        payload.apply_to(&mut document);

        state.record_version(&document, None);
        state.documents.insert(document_id.to_string(), document.clone());
        Ok(document)
    }

    async fn publish(&self, document_id: &str, document: Document) -> AdapterResult<Document> {
        let mut state = self.state();
        state.publishes += 1;

        if state.fail_saves {
            return Err(AdapterError::Transport("publish unavailable".to_string()));
        }
        if document.id != document_id {
            return Err(AdapterError::Rejected(format!(
                "document id {} does not match {}",
                document.id, document_id
            )));
        }

        state.record_version(&document, Some("Published".to_string()));
        state.documents.insert(document_id.to_string(), document.clone());
        Ok(document)
    }
}

#[async_trait]
impl VersionStore for MockBackend {
    async fn list_versions(&self, document_id: &str) -> AdapterResult<Vec<Version>> {
        let mut versions = self
            .state()
            .versions
            .get(document_id)
            .cloned()
            .unwrap_or_default();
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        Ok(versions)
    }

    async fn restore_version(&self, document_id: &str, version_id: &str) -> AdapterResult<Document> {
        let mut state = self.state();

        let version = state
            .versions
            .get(document_id)
            .and_then(|versions| versions.iter().find(|v| v.id == version_id))
            .cloned()
            .ok_or_else(|| AdapterError::NotFound(format!("version {}", version_id)))?;

        let mut document = state
            .documents
            .get(document_id)
            .cloned()
            .unwrap_or_else(|| Document::new(document_id));
        document.replace_blocks(version.blocks);
        document.title = version.title;
        document.meta_description = version.meta_description;

        state.record_version(
            &document,
            Some(format!("Restored version {}", version.version_number)),
        );
        state.documents.insert(document_id.to_string(), document.clone());
        Ok(document)
    }
}

#[async_trait]
impl LockApi for MockBackend {
    async fn get_lock_status(&self, document_id: &str) -> AdapterResult<LockStatus> {
        let mut state = self.state();
        state.lock_polls += 1;

        if state.fail_lock_polls {
            return Err(AdapterError::Transport("lock service unavailable".to_string()));
        }

        Ok(state.locks.get(document_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl SectionGenerator for MockBackend {
    async fn generate_section(
        &self,
        kind: SectionKind,
        title: &str,
        _existing_content: &str,
    ) -> AdapterResult<Map<String, Value>> {
        if let Some(payload) = self.state().sections.get(&kind) {
            return Ok(payload.clone());
        }

        let generated = match kind {
            SectionKind::Faq => json!({
                "question": format!("What should I know about {}?", title),
                "answer": format!("Start with the essentials of {}.", title),
            }),
            SectionKind::Tips => json!({ "items": [format!("Plan ahead for {}", title)] }),
            SectionKind::Highlights => json!({ "items": [format!("The best of {}", title)] }),
        };

        match generated {
            Value::Object(map) => Ok(map),
            _ => Err(AdapterError::Rejected("generator returned a non-object".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_saves_create_versions_newest_first() {
        let backend = MockBackend::new();
        let mut doc = Document::new("page-1");

        doc.title = "First".to_string();
        backend.save("page-1", SavePayload::capture(&doc, 1)).await.unwrap();
        doc.title = "Second".to_string();
        backend.save("page-1", SavePayload::capture(&doc, 2)).await.unwrap();

        let versions = backend.list_versions("page-1").await.unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].version_number, 2);
        assert_eq!(versions[0].title, "Second");
        assert_eq!(versions[1].version_number, 1);
    }

    #[tokio::test]
    async fn test_restore_unknown_version_is_not_found() {
        let backend = MockBackend::new();
        let err = backend.restore_version("page-1", "nope").await.unwrap_err();
        assert!(matches!(err, AdapterError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failing_saves() {
        let backend = MockBackend::new();
        backend.set_fail_saves(true);

        let doc = Document::new("page-1");
        let err = backend.save("page-1", SavePayload::capture(&doc, 1)).await.unwrap_err();

        assert!(matches!(err, AdapterError::Transport(_)));
        assert_eq!(backend.saves(), 1);
        assert_eq!(backend.version_count("page-1"), 0);
    }

    #[tokio::test]
    async fn test_generated_section_uses_title() {
        let backend = MockBackend::new();
        let payload = backend
            .generate_section(SectionKind::Faq, "Lisbon", "")
            .await
            .unwrap();

        assert_eq!(
            payload.get("question").and_then(Value::as_str),
            Some("What should I know about Lisbon?")
        );
    }
}

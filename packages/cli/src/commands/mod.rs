pub mod apply;
pub mod block_types;
pub mod diff;
pub mod score;
pub mod validate;

pub use apply::{apply, ApplyArgs};
pub use block_types::{block_types, BlockTypesArgs};
pub use diff::{diff, DiffArgs};
pub use score::{score, ScoreArgs};
pub use validate::{validate, ValidateArgs};

use anyhow::Context;
use pagecraft_model::Document;
use std::path::Path;
use tracing::debug;

/// Output format shared by the commands
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Read a page document from a JSON file
pub fn read_document(path: &Path) -> anyhow::Result<Document> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let document = Document::from_json(&source)
        .with_context(|| format!("Invalid page document {}", path.display()))?;

    debug!(
        path = %path.display(),
        document_id = %document.id,
        blocks = document.blocks().len(),
        "Loaded page document"
    );
    Ok(document)
}

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_model::Document;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Page document (.json)
    pub document: PathBuf,
}

/// Check a stored document as-is; unlike the other commands this does not
/// renumber block order on load
pub fn validate(args: ValidateArgs) -> Result<()> {
    let source = std::fs::read_to_string(&args.document)
        .with_context(|| format!("Cannot read {}", args.document.display()))?;
    let document: Document = serde_json::from_str(&source)
        .with_context(|| format!("Invalid page document {}", args.document.display()))?;

    document
        .check_invariants()
        .with_context(|| format!("{} is inconsistent", args.document.display()))?;

    println!(
        "{} {} ({} blocks, {})",
        "✓".green(),
        args.document.display(),
        document.blocks().len(),
        document.status
    );
    Ok(())
}

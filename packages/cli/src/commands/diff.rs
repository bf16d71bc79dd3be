use super::{read_document, Format};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{diff as diff_pages, BlockChange, VersionDiff};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Current page document (.json)
    pub current: PathBuf,

    /// Previous page document (.json)
    pub previous: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

pub fn diff(args: DiffArgs) -> Result<()> {
    let current = read_document(&args.current)?;
    let previous = read_document(&args.previous)?;
    let changes = diff_pages(&current, &previous);

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&changes)?),
        Format::Text => print_changes(&changes),
    }

    Ok(())
}

fn print_changes(changes: &VersionDiff) {
    if changes.is_empty() {
        println!("{} No changes", "✓".green());
        return;
    }

    for field in &changes.fields {
        println!("{} {}", "~".yellow(), field.field.bold());
        println!("    {} {}", "-".red(), field.before);
        println!("    {} {}", "+".green(), field.after);
    }

    for change in &changes.blocks {
        println!("{}", describe(change));
    }
}

fn describe(change: &BlockChange) -> String {
    match change {
        BlockChange::Added {
            id,
            block_type,
            index,
        } => format!("{} {} block {} at {}", "+".green(), block_type, id, index),
        BlockChange::Removed {
            id,
            block_type,
            index,
        } => format!("{} {} block {} from {}", "-".red(), block_type, id, index),
        BlockChange::Modified { id, block_type } => {
            format!("{} {} block {} edited", "~".yellow(), block_type, id)
        }
        BlockChange::Moved { id, from, to } => {
            format!("{} block {} moved {} → {}", "↕".blue(), id, from, to)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::BlockType;

    #[test]
    fn test_describe_mentions_block() {
        let text = describe(&BlockChange::Added {
            id: "b1".to_string(),
            block_type: BlockType::Faq,
            index: 2,
        });
        assert!(text.contains("faq block b1 at 2"));
    }

    #[test]
    fn test_diff_files() {
        let dir = tempfile::tempdir().unwrap();
        let current = dir.path().join("current.json");
        let previous = dir.path().join("previous.json");
        std::fs::write(&current, r#"{ "id": "page", "title": "New" }"#).unwrap();
        std::fs::write(&previous, r#"{ "id": "page", "title": "Old" }"#).unwrap();

        let args = DiffArgs {
            current,
            previous,
            format: Format::Json,
        };
        assert!(diff(args).is_ok());
    }
}

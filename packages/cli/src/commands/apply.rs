use super::read_document;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{EditorConfig, EditorSession};
use pagecraft_model::Command;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Page document (.json)
    pub document: PathBuf,

    /// JSON array of commands, `"undo"` or `"redo"`
    pub commands: PathBuf,

    /// Write the resulting document here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// One scripted editor action
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Command(Command),
    History(HistoryStep),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStep {
    Undo,
    Redo,
}

pub fn apply(args: ApplyArgs, config: &EditorConfig) -> Result<()> {
    let document = read_document(&args.document)?;
    let steps = read_steps(&args.commands)?;

    let mut session = EditorSession::open(document, config.clone());
    let summary = run_steps(&mut session, steps)?;

    let output = serde_json::to_string_pretty(session.document())?;
    session.close();

    match &args.out {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("Cannot write {}", path.display()))?;
            eprintln!(
                "{} {} steps applied ({} changed), {} blocks → {}",
                "✓".green(),
                summary.steps,
                summary.changed,
                summary.blocks,
                path.display()
            );
        }
        None => println!("{}", output),
    }

    Ok(())
}

fn read_steps(path: &Path) -> Result<Vec<Step>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("Invalid command list {}", path.display()))
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub steps: usize,
    pub changed: usize,
    pub blocks: usize,
}

pub fn run_steps(session: &mut EditorSession, steps: Vec<Step>) -> Result<Summary> {
    let mut summary = Summary::default();

    for step in steps {
        let before = session.edit_seq();
        match step {
            Step::Command(command) => {
                session.apply(command)?;
            }
            Step::History(HistoryStep::Undo) => {
                session.undo()?;
            }
            Step::History(HistoryStep::Redo) => {
                session.redo()?;
            }
        }

        summary.steps += 1;
        if session.edit_seq() != before {
            summary.changed += 1;
        }
    }

    summary.blocks = session.blocks().len();
    Ok(summary)
}

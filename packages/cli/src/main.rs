mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, block_types, diff, score, validate, ApplyArgs, BlockTypesArgs, DiffArgs, ScoreArgs,
    ValidateArgs,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Pagecraft CLI - inspect and edit block pages from the terminal
#[derive(Parser, Debug)]
#[command(name = "pagecraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to pagecraft.config.json in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the SEO score of page documents
    Score(ScoreArgs),

    /// Run a list of editor commands against a page
    Apply(ApplyArgs),

    /// Compare two versions of a page
    Diff(DiffArgs),

    /// Check block ordering and workflow invariants
    Validate(ValidateArgs),

    /// List the available block types and their default payloads
    BlockTypes(BlockTypesArgs),
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = config::load(&cwd, cli.config.as_deref())?;

    match cli.command {
        Command::Score(args) => score(args, &config),
        Command::Apply(args) => apply(args, &config),
        Command::Diff(args) => diff(args),
        Command::Validate(args) => validate(args),
        Command::BlockTypes(args) => block_types(args),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

use super::{read_document, Format};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{EditorConfig, DEFAULT_CONFIG_NAME};
use pagecraft_seo::{score as score_document, validate, Category, SeoReport, SeoValidation};
use serde_json::json;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Page document (.json) or a directory of them
    pub input: PathBuf,

    /// Show passed checks too
    #[arg(short, long)]
    pub all: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

pub fn score(args: ScoreArgs, config: &EditorConfig) -> Result<()> {
    let files = if args.input.is_file() {
        vec![args.input.clone()]
    } else if args.input.is_dir() {
        find_documents(&args.input)
    } else {
        return Err(anyhow::anyhow!(
            "Input path does not exist: {}",
            args.input.display()
        ));
    };

    let mut results = Vec::with_capacity(files.len());
    for file in &files {
        let document = read_document(file)?;
        let report = score_document(&document);
        let validation = validate(&report, &config.seo);
        results.push((file, report, validation));
    }

    match args.format {
        Format::Json => {
            let value: Vec<_> = results
                .iter()
                .map(|(file, report, validation)| {
                    json!({
                        "file": file.display().to_string(),
                        "report": report,
                        "validation": validation,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Format::Text => {
            for (file, report, validation) in &results {
                print_report(file, report, validation, args.all);
            }
            if results.len() > 1 {
                let total: u32 = results.iter().map(|(_, r, _)| u32::from(r.score)).sum();
                println!(
                    "   Pages: {}, average score: {}",
                    results.len(),
                    total / results.len() as u32
                );
            }
        }
    }

    Ok(())
}

fn print_report(file: &Path, report: &SeoReport, validation: &SeoValidation, all: bool) {
    let score = match report.score {
        80..=100 => report.score.to_string().green().bold(),
        50..=79 => report.score.to_string().yellow().bold(),
        _ => report.score.to_string().red().bold(),
    };

    println!("{}", file.display());
    println!("   Score: {}/100 ({} words)", score, report.total_words);

    for category in Category::ALL {
        let (got, max) = report.category_score(category);
        println!("   {:<18} {:>2}/{}", category.label(), got, max);
    }

    for issue in &report.issues {
        println!("   {} {}", "✗".red(), issue);
    }
    if all {
        for passed in &report.passed {
            println!("   {} {}", "✓".green(), passed.dimmed());
        }
    }

    if validation.can_publish {
        println!("   {} Ready to publish", "✓".green());
    } else {
        println!("   {} Publishing blocked:", "✗".red());
        for blocking in &validation.blocking {
            println!("     - {}", blocking);
        }
    }
    println!();
}

fn find_documents(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path.extension().map(|e| e == "json").unwrap_or(false)
                && path.file_name().map(|n| n != DEFAULT_CONFIG_NAME).unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

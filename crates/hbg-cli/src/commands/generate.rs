use clap::Args;
use colored::*;
use std::path::PathBuf;

use hbg_config::GeneratorConfig;
use hbg_manifest::SequenceKey;

use crate::errors::GenerateError;
use crate::generator::{generate, GenerateOptions, GenerationSummary, ManifestOutcome};
use crate::logger;
use crate::GlobalOpts;

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateCommand {
    /// Directory containing the scripts (default: src/main/groovy)
    #[arg(short, long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Directory the documents are written to (default: target/classes)
    #[arg(short, long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Script file extension (default: groovy)
    #[arg(long)]
    pub extension: Option<String>,

    /// Keep blank lines where annotations were removed
    #[arg(long)]
    pub keep_line_count: bool,

    /// Action list key for reload entries without a version (default: 0.1)
    #[arg(long, value_name = "KEY")]
    pub action_key: Option<f64>,
}

impl GenerateCommand {
    /// Flags win over config values, which win over defaults
    pub fn options(&self, config: &GeneratorConfig) -> Result<GenerateOptions, GenerateError> {
        let mut options = GenerateOptions::from_config(config)?;
        if let Some(source) = &self.source {
            options.source_dir.clone_from(source);
        }
        if let Some(target) = &self.target {
            options.target_dir.clone_from(target);
        }
        if let Some(extension) = &self.extension {
            options.extension = extension.trim_start_matches('.').to_string();
        }
        if self.keep_line_count {
            options.keep_line_count = true;
        }
        if let Some(key) = self.action_key {
            options.default_action_key =
                SequenceKey::new(key).ok_or(GenerateError::InvalidActionKey(key))?;
        }
        Ok(options)
    }
}

pub fn handle_generate(
    cmd: GenerateCommand,
    config: &GeneratorConfig,
    opts: &GlobalOpts,
) -> Result<GenerationSummary, GenerateError> {
    let options = cmd.options(config)?;
    logger::debug(&format!(
        "Generating from {} into {}",
        options.source_dir.display(),
        options.target_dir.display()
    ));

    logger::spinner_start("Generating bootstrap documents");
    let result = generate(&options, |script| {
        logger::spinner_message(&format!("Processing {}", script.display()));
        logger::step(&format!("Processing {}", script.display()));
    });

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            logger::spinner_error("Generation failed");
            return Err(e);
        }
    };
    logger::spinner_success(&format!(
        "Generated {} documents from {} scripts",
        summary.documents.len(),
        summary.scripts
    ));

    if !opts.quiet {
        print_summary(&summary);
    }
    Ok(summary)
}

fn print_summary(summary: &GenerationSummary) {
    for document in &summary.documents {
        println!("  {} {}", "+".green(), document.display());
    }
    if summary.skipped() > 0 {
        logger::warn(&skipped_message(summary.skipped()));
    }
    match &summary.manifest {
        ManifestOutcome::Written { path, lists } => println!(
            "  {} {} ({} action lists, {} reload entries)",
            "+".green(),
            path.display(),
            lists,
            summary.reload_entries
        ),
        ManifestOutcome::Unchanged => println!("  {} action lists unchanged", "=".cyan()),
    }
}

/// Skipped scripts cover helpers without annotations, excluded or invalid
/// updaters and scripts that could not be interpreted
fn skipped_message(count: usize) -> String {
    let noun = if count == 1 { "script" } else { "scripts" };
    format!(
        "{} {} produced no document (not annotated, excluded or not interpretable; see `hbg inspect <file>`)",
        count, noun
    )
}

use anyhow::Context;
use clap::Args;
use colored::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use hbg_ast::document::{bootstrap_path, document_for, node_path};
use hbg_ast::{Interpreted, ScriptClassModel, ScriptExtractor};
use hbg_config::GeneratorConfig;
use hbg_manifest::SequenceKey;

use crate::logger;

#[derive(Args, Debug, Clone)]
pub struct InspectCommand {
    /// Script to inspect
    pub file: PathBuf,

    /// Print the extracted model as JSON
    #[arg(long)]
    pub json: bool,

    /// Keep blank lines where annotations were removed
    #[arg(long)]
    pub keep_line_count: bool,
}

#[derive(Serialize, Debug)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Report<'a> {
    Class {
        model: &'a ScriptClassModel,
        node_path: String,
        bootstrap_path: Option<String>,
        action_key: f64,
        document: Option<String>,
    },
    Skipped {
        file: &'a Path,
        reason: String,
    },
}

fn report<'a>(
    file: &'a Path,
    interpreted: &'a Interpreted,
    default_key: SequenceKey,
) -> anyhow::Result<Report<'a>> {
    Ok(match interpreted {
        Interpreted::Class(model) => Report::Class {
            node_path: node_path(model),
            bootstrap_path: bootstrap_path(model),
            action_key: default_key.value(),
            document: document_for(model).map(|doc| doc.to_yaml()).transpose()?,
            model: &**model,
        },
        Interpreted::Skipped(reason) => Report::Skipped {
            file,
            reason: reason.to_string(),
        },
    })
}

/// JSON rendering of what the generator sees in `file`
pub fn render_json(
    file: &Path,
    interpreted: &Interpreted,
    default_key: SequenceKey,
) -> anyhow::Result<String> {
    let report = report(file, interpreted, default_key)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn handle_inspect(cmd: InspectCommand, config: &GeneratorConfig) -> anyhow::Result<()> {
    logger::debug(&format!("Inspecting {}", cmd.file.display()));
    let keep_line_count = cmd.keep_line_count || config.keep_line_count_or_default();
    let default_key =
        SequenceKey::new(config.default_action_key_or_default()).unwrap_or(SequenceKey::DEFAULT);

    let mut extractor = ScriptExtractor::new(keep_line_count);
    let interpreted = extractor
        .interpret(&cmd.file)
        .with_context(|| format!("Failed to inspect {}", cmd.file.display()))?;

    if cmd.json {
        println!("{}", render_json(&cmd.file, &interpreted, default_key)?);
        return Ok(());
    }

    match report(&cmd.file, &interpreted, default_key)? {
        Report::Class {
            model,
            node_path,
            bootstrap_path,
            action_key,
            document,
        } => {
            println!("{} {}", "Class:".bold().green(), model.class_name());
            println!("  {}: {}", "node".cyan(), node_path);
            println!("  {}: {}", "valid".cyan(), model.is_valid());
            println!("  {}: {}", "excluded".cyan(), model.is_excluded());
            if let Some(path) = bootstrap_path {
                println!("  {}: {} ({})", "reload".cyan(), path, action_key);
            }
            match document {
                Some(yaml) => {
                    println!("{}", "Document:".bold().green());
                    print!("{}", yaml);
                }
                None => println!("  {}", "(no document)".yellow()),
            }
        }
        Report::Skipped { file, reason } => {
            println!(
                "{} {} ({})",
                "Skipped:".bold().yellow(),
                file.display(),
                reason
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn interpret(content: &str) -> Result<(TempDir, PathBuf, Interpreted), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let path = dir.path().join("Script.groovy");
        fs::write(&path, content)?;
        let interpreted = ScriptExtractor::new(false).interpret(&path)?;
        Ok((dir, path, interpreted))
    }

    #[test]
    fn test_json_for_class() -> TestResult {
        let (_dir, path, interpreted) = interpret(
            "@Bootstrap(reload = true, version = '1.5')\n@Updater(name = 'Inspect', batchSize = 5)\nclass Inspect {}\n",
        )?;
        let json: Value = serde_json::from_str(&render_json(&path, &interpreted, SequenceKey::DEFAULT)?)?;

        assert_eq!(json["status"], "class");
        assert_eq!(json["model"]["class_name"], "Inspect");
        assert_eq!(json["model"]["updater"]["batch_size"], 5);
        assert_eq!(json["action_key"], 0.1);
        assert_eq!(
            json["bootstrap_path"],
            "/hippo:configuration/hippo:update/hippo:queue/Inspect"
        );
        assert!(json["document"]
            .as_str()
            .is_some_and(|doc| doc.contains("hipposys:batchsize: 5")));
        Ok(())
    }

    #[test]
    fn test_json_for_skipped() -> TestResult {
        let (_dir, path, interpreted) = interpret("class Helper {}\n")?;
        let json: Value = serde_json::from_str(&render_json(&path, &interpreted, SequenceKey::DEFAULT)?)?;
        assert_eq!(json["status"], "skipped");
        assert!(json["reason"].is_string());
        Ok(())
    }
}

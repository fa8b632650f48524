use crate::logger;
use colored::*;
use hbg_config::CONFIG_FILE_NAME;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Skips the overwrite prompt when set
pub const INIT_YES_ENV_VAR: &str = "HBG_INIT_YES";

const CONFIG_TEMPLATE: &str = r#"# hbg configuration
# Command line flags take precedence over the values below.

# Directory scanned for annotated updater scripts
source-dir = "src/main/groovy"

# Directory the generated documents and hcm-actions.yaml are written to
target-dir = "target/classes"

# Extension of the script files
extension = "groovy"

# Keep a blank line for every removed annotation line so that line numbers in
# the stored script match the source
keep-line-count = false

# Action list key for reload entries of scripts without a numeric version
default-action-key = 0.1

# Log file location (default: ~/.config/hbg/hbg.log)
# log-file = "target/hbg.log"
"#;

/// Initialize a new configuration file
pub fn handle_init(filename: Option<String>) -> io::Result<()> {
    logger::debug("Handling init command");

    let target_filename = filename.unwrap_or_else(|| CONFIG_FILE_NAME.to_string());
    let target_path = Path::new(&target_filename);
    logger::debug(&format!("Target file: {}", target_filename));

    if target_path.exists() {
        if std::env::var(INIT_YES_ENV_VAR).is_ok() {
            logger::debug(&format!("Skipping confirmation ({} set)", INIT_YES_ENV_VAR));
        } else {
            print!(
                "{} File '{}' already exists. Overwrite? {} ",
                "?".bold().cyan(),
                target_filename,
                "[y/n] ›".dimmed()
            );
            io::stdout().flush()?;

            let mut response = String::new();
            io::stdin().read_line(&mut response)?;
            let response = response.trim().to_lowercase();
            if response != "y" && response != "yes" {
                logger::info("Operation cancelled by user");
                println!("Operation cancelled.");
                return Ok(());
            }
        }
    }

    if let Some(parent) = target_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(target_path, CONFIG_TEMPLATE)?;

    logger::success(&format!("Created configuration file: {}", target_filename));
    println!();
    println!("Next steps:");
    println!(
        "  1. Point {} at your scripts in {}",
        "source-dir".bold(),
        target_filename.bold()
    );
    println!("  2. Annotate updater scripts with @Updater and @Bootstrap");
    println!("  3. Generate the bootstrap files: hbg generate");
    Ok(())
}

use crate::logger;
use crate::GlobalOpts;
use clap::Subcommand;
use colored::*;
use hbg_config::{ConfigError, GeneratorConfig, CONFIG_ENV_VAR};

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the configured values
    Show,
    /// Set a value and save the configuration file
    Set { key: String, value: String },
    /// Print the path of the configuration file in use
    Path,
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> Result<(), ConfigError> {
    let config_path = GeneratorConfig::path();
    logger::debug(&format!("Reading config from: {}", config_path.display()));

    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = GeneratorConfig::load_from_path(&config_path)?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in config.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = GeneratorConfig::load_from_path(&config_path)?;
            config.set(&key, &value)?;
            config.save_to_path(&config_path)?;
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
            if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
                if !env_path.trim().is_empty() {
                    println!("{} {}", "set-by".cyan(), CONFIG_ENV_VAR);
                }
            }
        }
    }
    Ok(())
}

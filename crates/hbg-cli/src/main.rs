use anyhow::Context;
use clap::{Parser, Subcommand};
use hbg::{
    commands::{
        config::{self, ConfigAction},
        generate::{self, GenerateCommand},
        init,
        inspect::{self, InspectCommand},
    },
    logger, GlobalOpts,
};
use hbg_config::{ConfigError, GeneratorConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Overrides the console filter derived from `-v`
const LOG_FILTER_ENV_VAR: &str = "HBG_LOG";

#[derive(Parser)]
#[command(name = "hbg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Hippo bootstrap generator",
    long_about = "hbg turns annotated Groovy updater scripts into Hippo bootstrap configuration and hcm-actions.yaml."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate documents and the action manifest from the source scripts
    Generate(GenerateCommand),
    /// Show what the generator extracts from a single script
    Inspect(InspectCommand),
    /// Initialize a new hbg.toml
    Init {
        /// Optional filename for the configuration (default: hbg.toml)
        file: Option<String>,
    },
    /// Configure hbg
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(logger::verbosity_to_filter()));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn run(cli: Cli, loaded: Result<GeneratorConfig, ConfigError>) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(cmd) => {
            let config = loaded.context("Failed to load config")?;
            generate::handle_generate(cmd, &config, &cli.global)?;
        }
        Commands::Inspect(cmd) => {
            let config = loaded.context("Failed to load config")?;
            inspect::handle_inspect(cmd, &config)?;
        }
        Commands::Init { file } => {
            init::handle_init(file).context("Init command failed")?;
        }
        Commands::Config { action } => {
            config::handle_config(action, &cli.global)?;
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let config = GeneratorConfig::load();

    let log_file = cli.global.log_file.clone().or_else(|| {
        config
            .as_ref()
            .ok()
            .and_then(|config| config.log_file.clone())
    });
    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), log_file.as_deref())
    {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    if let Err(e) = run(cli, config) {
        logger::error(&format!("{:#}", e));
        logger::show_log_path();
        std::process::exit(1);
    }
}

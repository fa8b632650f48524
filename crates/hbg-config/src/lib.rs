//! Configuration for the hbg bootstrap generator
//!
//! Holds the optional `hbg.toml` settings file and the path helpers shared by the
//! extraction and generation crates.

pub mod config;
pub mod paths;

pub use config::{ConfigError, GeneratorConfig, CONFIG_ENV_VAR, CONFIG_FILE_NAME};

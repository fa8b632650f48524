use std::io;
use thiserror::Error;

/// Errors that can occur while reading or writing manifests and documents
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid action manifest: {0}")]
    InvalidManifest(String),

    #[error("Invalid configuration document: {0}")]
    InvalidDocument(String),
}

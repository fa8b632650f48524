//! Error types for a generation run

use hbg_ast::ExtractError;
use hbg_config::ConfigError;
use hbg_manifest::ManifestError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a generation run
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Source directory does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Failed to write output: {0}")]
    Manifest(#[from] ManifestError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid action list key: {0}")]
    InvalidActionKey(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_generate_error_display() {
        let err = GenerateError::SourceNotFound(PathBuf::from("src/main/groovy"));
        assert_eq!(
            err.to_string(),
            "Source directory does not exist: src/main/groovy"
        );

        let err = GenerateError::InvalidActionKey(f64::NAN);
        assert_eq!(err.to_string(), "Invalid action list key: NaN");
    }

    #[test]
    fn test_extract_error_is_transparent() {
        let source = hbg_ast::NameError::Empty;
        let err = GenerateError::from(ExtractError::InvalidUpdaterName {
            path: Path::new("/work/Bad.groovy").to_path_buf(),
            name: String::new(),
            source,
        });
        assert_eq!(
            err.to_string(),
            "Error parsing the updater name for: /work/Bad.groovy"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}

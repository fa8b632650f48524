//! Reading and writing generated files

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::actions::{from_yaml_str, to_yaml_string};
use crate::document::ConfigDocument;
use crate::errors::ManifestError;
use crate::types::ActionList;

/// Read an action manifest, returning an empty list if the file doesn't exist
pub fn read_action_list(path: &Path) -> Result<ActionList, ManifestError> {
    if !path.exists() {
        debug!("No action manifest at {:?}", path);
        return Ok(ActionList::new());
    }

    debug!("Reading action manifest from: {:?}", path);
    let content = fs::read_to_string(path)?;
    let list = from_yaml_str(&content)?;
    debug!("Loaded {} action list entries", list.len());
    Ok(list)
}

/// Write an action manifest, creating parent directories as needed
pub fn write_action_list(list: &ActionList, path: &Path) -> Result<(), ManifestError> {
    ensure_parent(path)?;
    fs::write(path, to_yaml_string(list)?)?;
    info!("Action manifest written to: {:?} ({} keys)", path, list.len());
    Ok(())
}

/// Write a configuration document, creating parent directories as needed
pub fn write_document(document: &ConfigDocument, path: &Path) -> Result<(), ManifestError> {
    ensure_parent(path)?;
    fs::write(path, document.to_yaml()?)?;
    debug!("Document for {} written to: {:?}", document.node_path(), path);
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), ManifestError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

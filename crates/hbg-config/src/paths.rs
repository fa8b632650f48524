//! Path helpers shared by the extraction and generation crates
//!
//! Generated file names must not depend on the host path convention, so every
//! relative path produced here uses `/` separators.

use std::path::{Component, Path};

/// Extension of generated configuration documents and manifests
pub const YAML_EXTENSION: &str = "yaml";

/// Path of `file` relative to `base`, joined with `/`.
///
/// Returns `None` when `file` does not live under `base`.
pub fn relative_unix_path(base: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(base).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Relative document path for a script: `relative(base, file)` with the
/// extension replaced by `.yaml`.
///
/// # Examples
/// - `base/updaters/Cleanup.groovy` -> `updaters/Cleanup.yaml`
/// - `base/Plain` -> `Plain.yaml`
pub fn yaml_file_name(base: &Path, file: &Path) -> Option<String> {
    let relative = relative_unix_path(base, file)?;
    Some(format!("{}.{}", remove_extension(&relative), YAML_EXTENSION))
}

/// Drop the extension of the last path segment only
fn remove_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |idx| idx + 1);
    match path[name_start..].rfind('.') {
        Some(0) | None => path,
        Some(dot) => &path[..name_start + dot],
    }
}

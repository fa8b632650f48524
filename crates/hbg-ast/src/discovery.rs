//! Locating script files below a source directory

use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// All files below `root` with the given extension, in lexicographic path
/// order. Unreadable directory entries are skipped.
pub fn discover_scripts(root: &Path, extension: &str) -> Vec<PathBuf> {
    let extension = extension.trim_start_matches('.');
    let mut scripts: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some(extension))
        .collect();
    scripts.sort();

    for script in &scripts {
        debug!("Found script: {:?}", script);
    }
    info!("Found {} .{} scripts under {:?}", scripts.len(), extension, root);
    scripts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_scripts_sorted_and_filtered() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("b").join("nested"))?;
        fs::create_dir_all(root.join("a"))?;
        fs::write(root.join("b").join("nested").join("Z.groovy"), "")?;
        fs::write(root.join("b").join("A.groovy"), "")?;
        fs::write(root.join("a").join("C.groovy"), "")?;
        fs::write(root.join("a").join("notes.txt"), "")?;
        fs::write(root.join("hcm-actions.yaml"), "")?;

        let found: Vec<PathBuf> = discover_scripts(root, ".groovy")
            .into_iter()
            .filter_map(|p| p.strip_prefix(root).ok().map(Path::to_path_buf))
            .collect();
        assert_eq!(
            found,
            vec![
                PathBuf::from("a/C.groovy"),
                PathBuf::from("b/A.groovy"),
                PathBuf::from("b/nested/Z.groovy"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_missing_root_finds_nothing() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        assert!(discover_scripts(&temp_dir.path().join("missing"), "groovy").is_empty());
        Ok(())
    }
}

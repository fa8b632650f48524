//! Generation run: scripts in, documents and the action manifest out

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use hbg_ast::{discover_scripts, DocumentBuilder};
use hbg_config::GeneratorConfig;
use hbg_manifest::constants::HCM_ACTIONS_NAME;
use hbg_manifest::{
    collect_action_lists, write_action_list, write_document, Action, ActionList, SequenceKey,
};

use crate::errors::GenerateError;

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub extension: String,
    pub keep_line_count: bool,
    pub default_action_key: SequenceKey,
}

impl GenerateOptions {
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GenerateError> {
        let key = config.default_action_key_or_default();
        Ok(GenerateOptions {
            source_dir: config.source_dir_or_default(),
            target_dir: config.target_dir_or_default(),
            extension: config.extension_or_default(),
            keep_line_count: config.keep_line_count_or_default(),
            default_action_key: SequenceKey::new(key)
                .ok_or(GenerateError::InvalidActionKey(key))?,
        })
    }
}

/// What happened to `hcm-actions.yaml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestOutcome {
    Written { path: PathBuf, lists: usize },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Number of script files found
    pub scripts: usize,
    /// Written documents, in processing order
    pub documents: Vec<PathBuf>,
    pub reload_entries: usize,
    pub manifest: ManifestOutcome,
}

impl GenerationSummary {
    pub fn skipped(&self) -> usize {
        self.scripts - self.documents.len()
    }
}

/// Run the generator over `options.source_dir`.
///
/// `progress` is called with each script before it is processed. The run stops
/// at the first invalid updater name; documents written before that stay on
/// disk and the manifest is not touched.
pub fn generate(
    options: &GenerateOptions,
    mut progress: impl FnMut(&Path),
) -> Result<GenerationSummary, GenerateError> {
    if !options.source_dir.is_dir() {
        return Err(GenerateError::SourceNotFound(options.source_dir.clone()));
    }

    let scripts = discover_scripts(&options.source_dir, &options.extension);
    info!(
        "Found {} scripts in {}",
        scripts.len(),
        options.source_dir.display()
    );

    let mut builder = DocumentBuilder::new(&options.source_dir, options.keep_line_count)
        .with_default_key(options.default_action_key);
    let mut derived = ActionList::new();
    let mut documents = Vec::new();
    let mut reload_entries = 0;

    for script in &scripts {
        progress(script);
        let Some(built) = builder.build(script)? else {
            continue;
        };

        let output = options.target_dir.join(&built.document_file);
        write_document(&built.document, &output)?;
        debug!("Wrote {}", output.display());

        if let Some(path) = built.manifest_path {
            derived.insert(built.action_key, path, Action::Reload);
            reload_entries += 1;
        }
        documents.push(output);
    }

    let manifest =
        match collect_action_lists(&options.source_dir, &options.target_dir, &derived)? {
            Some(list) => {
                let path = options.target_dir.join(HCM_ACTIONS_NAME);
                write_action_list(&list, &path)?;
                info!("Wrote {} action lists to {}", list.len(), path.display());
                ManifestOutcome::Written {
                    path,
                    lists: list.len(),
                }
            }
            None => ManifestOutcome::Unchanged,
        };

    Ok(GenerationSummary {
        scripts: scripts.len(),
        documents,
        reload_entries,
        manifest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbg_ast::ExtractError;
    use hbg_manifest::read_action_list;
    use std::error::Error;
    use std::fs;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn Error>>;

    struct Workspace {
        _dir: TempDir,
        options: GenerateOptions,
    }

    fn workspace() -> Result<Workspace, Box<dyn Error>> {
        let dir = TempDir::new()?;
        let source_dir = dir.path().join("src");
        fs::create_dir_all(&source_dir)?;
        let options = GenerateOptions {
            source_dir,
            target_dir: dir.path().join("target"),
            extension: "groovy".to_string(),
            keep_line_count: false,
            default_action_key: SequenceKey::DEFAULT,
        };
        Ok(Workspace { _dir: dir, options })
    }

    fn add_script(options: &GenerateOptions, relative: &str, content: &str) -> TestResult {
        let path = options.source_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    #[test]
    fn test_empty_source_leaves_manifest_alone() -> TestResult {
        let ws = workspace()?;
        let summary = generate(&ws.options, |_| {})?;
        assert_eq!(summary.scripts, 0);
        assert_eq!(summary.manifest, ManifestOutcome::Unchanged);
        assert!(!ws.options.target_dir.join(HCM_ACTIONS_NAME).exists());
        Ok(())
    }

    #[test]
    fn test_documents_and_reload_entries() -> TestResult {
        let ws = workspace()?;
        let options = &ws.options;
        add_script(
            options,
            "updaters/Reload.groovy",
            "@Bootstrap(reload = true)\n@Updater(name = 'Reload')\nclass Reload {}\n",
        )?;
        add_script(
            options,
            "Versioned.groovy",
            "@Bootstrap(reload = true, version = '3')\n@Updater(name = 'Versioned')\nclass Versioned {}\n",
        )?;
        add_script(options, "Plain.groovy", "@Updater(name = 'Plain')\nclass Plain {}\n")?;
        add_script(options, "Helper.groovy", "class Helper {}\n")?;
        add_script(options, "notes.txt", "@Updater(name = 'Ignored')\nclass X {}\n")?;

        let mut seen = Vec::new();
        let summary = generate(options, |script| seen.push(script.to_path_buf()))?;

        assert_eq!(summary.scripts, 4);
        assert_eq!(seen.len(), 4);
        assert_eq!(summary.documents.len(), 3);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.reload_entries, 2);
        assert!(options.target_dir.join("updaters/Reload.yaml").is_file());
        assert!(options.target_dir.join("Plain.yaml").is_file());

        let manifest = read_action_list(&options.target_dir.join(HCM_ACTIONS_NAME))?;
        assert_eq!(manifest.len(), 1);
        let default_entry = manifest
            .get(SequenceKey::DEFAULT)
            .ok_or("missing default key")?;
        assert_eq!(
            default_entry.actions.get("/hippo:configuration/hippo:update/hippo:queue/Reload"),
            Some(&Action::Reload)
        );
        assert_eq!(
            default_entry.actions.get("/hippo:configuration/hippo:update/hippo:queue/Versioned"),
            Some(&Action::Reload)
        );
        Ok(())
    }

    #[test]
    fn test_source_manifest_overrides_generated() -> TestResult {
        let ws = workspace()?;
        let options = &ws.options;
        add_script(
            options,
            "Reload.groovy",
            "@Bootstrap(reload = true)\n@Updater(name = 'Reload')\nclass Reload {}\n",
        )?;
        fs::write(
            options.source_dir.join(HCM_ACTIONS_NAME),
            "action-lists:\n- 0.1:\n    /hippo:configuration/hippo:update/hippo:queue/Reload: delete\n",
        )?;

        generate(options, |_| {})?;

        let manifest = read_action_list(&options.target_dir.join(HCM_ACTIONS_NAME))?;
        let entry = manifest
            .get(SequenceKey::DEFAULT)
            .ok_or("missing default key")?;
        assert_eq!(
            entry.actions.get("/hippo:configuration/hippo:update/hippo:queue/Reload"),
            Some(&Action::Delete)
        );
        Ok(())
    }

    #[test]
    fn test_invalid_name_aborts_run() -> TestResult {
        let ws = workspace()?;
        let options = &ws.options;
        add_script(
            options,
            "Bad.groovy",
            "@Bootstrap(reload = true)\n@Updater(name = '///bad:::')\nclass Bad {}\n",
        )?;

        let err = generate(options, |_| {}).err().ok_or("expected an error")?;
        assert!(matches!(
            err,
            GenerateError::Extract(ExtractError::InvalidUpdaterName { .. })
        ));
        assert!(!options.target_dir.join(HCM_ACTIONS_NAME).exists());
        Ok(())
    }

    #[test]
    fn test_missing_source_dir() -> TestResult {
        let ws = workspace()?;
        let options = GenerateOptions {
            source_dir: ws.options.source_dir.join("missing"),
            ..ws.options.clone()
        };
        assert!(matches!(
            generate(&options, |_| {}),
            Err(GenerateError::SourceNotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_options_from_config() -> TestResult {
        let mut config = GeneratorConfig::default();
        config.set("source-dir", "scripts")?;
        config.set("keep-line-count", "true")?;

        let options = GenerateOptions::from_config(&config)?;
        assert_eq!(options.source_dir, PathBuf::from("scripts"));
        assert_eq!(options.target_dir, PathBuf::from("target/classes"));
        assert_eq!(options.extension, "groovy");
        assert!(options.keep_line_count);
        assert_eq!(options.default_action_key, SequenceKey::DEFAULT);
        Ok(())
    }
}

//! Typed view of a parsed script
//!
//! A [`ScriptClassModel`] pairs the script file with the values of its
//! Bootstrap and Updater annotations and with the annotation-stripped body
//! that ends up in the generated document.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::annotations::{AnnotationKind, FieldValues};
use crate::errors::{EvalError, NameError};
use crate::naming::{validate_name, NamespaceMapping};
use crate::normalize::normalize_line_endings;
use crate::parser::ParsedUnit;

/// A script path with its line-normalized content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptFile {
    path: PathBuf,
    #[serde(skip)]
    content: String,
}

impl ScriptFile {
    pub fn read(path: &Path) -> io::Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(ScriptFile::from_content(path, &raw))
    }

    pub fn from_content(path: &Path, raw: &str) -> Self {
        ScriptFile {
            path: path.to_path_buf(),
            content: normalize_line_endings(raw),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRoot {
    #[default]
    Queue,
    Registry,
}

impl ContentRoot {
    /// Only an exact `registry` selects the registry
    pub fn from_declared(value: &str) -> Self {
        if value == "registry" {
            ContentRoot::Registry
        } else {
            ContentRoot::Queue
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentRoot::Queue => "queue",
            ContentRoot::Registry => "registry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootstrapInfo {
    pub contentroot: ContentRoot,
    pub reload: bool,
    pub sequence: f64,
    pub version: String,
    pub exclude: bool,
}

static DEFAULT_BOOTSTRAP: BootstrapInfo = BootstrapInfo {
    contentroot: ContentRoot::Queue,
    reload: false,
    sequence: 99999.0,
    version: String::new(),
    exclude: false,
};

impl BootstrapInfo {
    pub fn from_values(values: &FieldValues) -> Self {
        BootstrapInfo {
            contentroot: ContentRoot::from_declared(values.string("contentroot")),
            reload: values.boolean("reload"),
            sequence: values.double("sequence"),
            version: values.string("version").to_string(),
            exclude: values.boolean("exclude"),
        }
    }
}

impl Default for BootstrapInfo {
    fn default() -> Self {
        DEFAULT_BOOTSTRAP.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdaterInfo {
    pub name: String,
    pub description: String,
    pub path: String,
    pub xpath: String,
    pub parameters: String,
    pub batch_size: i64,
    pub throttle: i64,
    pub dry_run: bool,
}

static DEFAULT_UPDATER: UpdaterInfo = UpdaterInfo {
    name: String::new(),
    description: String::new(),
    path: String::new(),
    xpath: String::new(),
    parameters: String::new(),
    batch_size: 10,
    throttle: 1000,
    dry_run: false,
};

impl UpdaterInfo {
    pub fn from_values(values: &FieldValues) -> Self {
        UpdaterInfo {
            name: values.string("name").to_string(),
            description: values.string("description").to_string(),
            path: values.string("path").to_string(),
            xpath: values.string("xpath").to_string(),
            parameters: values.string("parameters").to_string(),
            batch_size: values.integer("batchSize"),
            throttle: values.integer("throttle"),
            dry_run: values.boolean("dryRun"),
        }
    }
}

/// Why a parsed unit could not become a model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error(transparent)]
    Evaluation(#[from] EvalError),

    #[error("invalid updater name '{name}': {source}")]
    InvalidName {
        name: String,
        #[source]
        source: NameError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptClassModel {
    file: ScriptFile,
    class_name: String,
    bootstrap: Option<BootstrapInfo>,
    updater: Option<UpdaterInfo>,
    #[serde(skip)]
    script: String,
}

impl ScriptClassModel {
    /// Evaluate the annotations of `unit` and validate the updater name.
    ///
    /// `script` is the annotation-stripped body of `file`.
    pub fn from_unit(
        file: ScriptFile,
        unit: &ParsedUnit,
        script: String,
        namespaces: &NamespaceMapping,
    ) -> Result<Self, ModelError> {
        let mut bootstrap = None;
        let mut updater = None;

        for annotation in &unit.annotations {
            let kind = resolve_kind(unit, &annotation.name)?;
            let values = kind.evaluate(&annotation.arguments)?;
            let duplicate = match kind {
                AnnotationKind::Bootstrap => bootstrap
                    .replace(BootstrapInfo::from_values(&values))
                    .is_some(),
                AnnotationKind::Updater => {
                    updater.replace(UpdaterInfo::from_values(&values)).is_some()
                }
            };
            if duplicate {
                return Err(EvalError::DuplicateAnnotation(kind.simple_name()).into());
            }
        }

        if let Some(info) = &updater {
            validate_name(&info.name, namespaces).map_err(|source| ModelError::InvalidName {
                name: info.name.clone(),
                source,
            })?;
        }

        Ok(ScriptClassModel {
            file,
            class_name: unit.class_name.clone(),
            bootstrap,
            updater,
            script,
        })
    }

    pub fn file(&self) -> &ScriptFile {
        &self.file
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Script body with both annotations stripped
    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn bootstrap_annotation(&self) -> Option<&BootstrapInfo> {
        self.bootstrap.as_ref()
    }

    pub fn updater_annotation(&self) -> Option<&UpdaterInfo> {
        self.updater.as_ref()
    }

    /// A script is usable when it declares an updater with a name
    pub fn is_valid(&self) -> bool {
        self.updater.as_ref().is_some_and(|u| !u.name.is_empty())
    }

    pub fn is_excluded(&self) -> bool {
        self.bootstrap().exclude
    }

    /// Bootstrap values, or the annotation defaults when it is absent
    pub fn bootstrap(&self) -> &BootstrapInfo {
        self.bootstrap.as_ref().unwrap_or(&DEFAULT_BOOTSTRAP)
    }

    /// Updater values, or the annotation defaults when it is absent
    pub fn updater(&self) -> &UpdaterInfo {
        self.updater.as_ref().unwrap_or(&DEFAULT_UPDATER)
    }

    pub fn name(&self) -> &str {
        &self.updater().name
    }

    pub fn description(&self) -> &str {
        &self.updater().description
    }

    pub fn path(&self) -> &str {
        &self.updater().path
    }

    pub fn xpath(&self) -> &str {
        &self.updater().xpath
    }

    pub fn parameters(&self) -> &str {
        &self.updater().parameters
    }

    pub fn batch_size(&self) -> i64 {
        self.updater().batch_size
    }

    pub fn throttle(&self) -> i64 {
        self.updater().throttle
    }

    pub fn dry_run(&self) -> bool {
        self.updater().dry_run
    }

    pub fn reload(&self) -> bool {
        self.bootstrap().reload
    }

    pub fn contentroot(&self) -> ContentRoot {
        self.bootstrap().contentroot
    }

    pub fn sequence(&self) -> f64 {
        self.bootstrap().sequence
    }

    pub fn version(&self) -> &str {
        &self.bootstrap().version
    }
}

/// Resolve an annotation name through the unit's imports
fn resolve_kind(unit: &ParsedUnit, name: &str) -> Result<AnnotationKind, EvalError> {
    let unresolved = || EvalError::UnresolvedAnnotation(name.to_string());

    if name.contains('.') {
        return AnnotationKind::from_qualified_name(name).ok_or_else(unresolved);
    }

    if let Some(import) = unit
        .imports
        .iter()
        .find(|import| import.visible_name() == Some(name))
    {
        return AnnotationKind::from_qualified_name(&import.path).ok_or_else(unresolved);
    }

    unit.imports
        .iter()
        .filter_map(|import| import.wildcard_package())
        .find_map(|package| AnnotationKind::from_qualified_name(&format!("{}.{}", package, name)))
        .ok_or_else(unresolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ParseError;
    use crate::parser::ParseContext;
    use std::error::Error;

    type TestResult = Result<(), Box<dyn Error>>;

    fn model(unit_text: &str) -> Result<Result<ScriptClassModel, ModelError>, ParseError> {
        let unit = ParseContext::new().parse_unit(unit_text)?;
        let file = ScriptFile::from_content(Path::new("Fix.groovy"), "");
        Ok(ScriptClassModel::from_unit(
            file,
            &unit,
            "body".to_string(),
            &NamespaceMapping::new(),
        ))
    }

    const IMPORTS: &str = "import nl.openweb.hippo.groovy.annotations.Bootstrap;\nimport nl.openweb.hippo.groovy.annotations.Updater;\n";

    #[test]
    fn test_model_from_both_annotations() -> TestResult {
        let model = model(&format!(
            "{}@Bootstrap(reload = true, contentroot = 'registry', version = '1.5')\n@Updater(name = 'Fix', batchSize = 50, dryRun = true)\nclass Fix {{}}",
            IMPORTS
        ))??;
        assert!(model.is_valid());
        assert!(!model.is_excluded());
        assert_eq!(model.name(), "Fix");
        assert_eq!(model.batch_size(), 50);
        assert_eq!(model.throttle(), 1000);
        assert!(model.dry_run());
        assert!(model.reload());
        assert_eq!(model.contentroot(), ContentRoot::Registry);
        assert_eq!(model.version(), "1.5");
        assert_eq!(model.sequence(), 99999.0);
        assert_eq!(model.script(), "body");
        assert_eq!(model.class_name(), "Fix");
        Ok(())
    }

    #[test]
    fn test_bootstrap_only_is_not_valid() -> TestResult {
        let model = model(&format!("{}@Bootstrap(exclude = true)\nclass Fix {{}}", IMPORTS))??;
        assert!(!model.is_valid());
        assert!(model.is_excluded());
        assert_eq!(model.name(), "");
        assert_eq!(model.batch_size(), 10);
        assert!(model.updater_annotation().is_none());
        Ok(())
    }

    #[test]
    fn test_absent_bootstrap_uses_defaults() -> TestResult {
        let model = model(&format!("{}@Updater(name = 'Fix')\nclass Fix {{}}", IMPORTS))??;
        assert_eq!(model.bootstrap(), &BootstrapInfo::default());
        assert_eq!(model.contentroot(), ContentRoot::Queue);
        assert!(!model.reload());
        assert!(model.bootstrap_annotation().is_none());
        Ok(())
    }

    #[test]
    fn test_names_resolve_through_imports() -> TestResult {
        let qualified =
            model("@nl.openweb.hippo.groovy.annotations.Updater(name = 'A')\nclass A {}")??;
        assert!(qualified.is_valid());

        let wildcard =
            model("import nl.openweb.hippo.groovy.annotations.*\n@Updater(name = 'B')\nclass B {}")??;
        assert!(wildcard.is_valid());

        let aliased = model(
            "import nl.openweb.hippo.groovy.annotations.Updater as U\n@U(name = 'C')\nclass C {}",
        )??;
        assert_eq!(aliased.name(), "C");

        let unresolved = model("@Updater(name = 'D')\nclass D {}")?;
        assert!(matches!(
            unresolved,
            Err(ModelError::Evaluation(EvalError::UnresolvedAnnotation(_)))
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_name_is_reported() -> TestResult {
        let result = model(&format!(
            "{}@Updater(name = '///bad:::')\nclass Fix {{}}",
            IMPORTS
        ))?;
        assert!(matches!(
            result,
            Err(ModelError::InvalidName {
                source: NameError::EmptySegment(0),
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn test_contentroot_requires_exact_registry() {
        assert_eq!(ContentRoot::from_declared("registry"), ContentRoot::Registry);
        assert_eq!(ContentRoot::from_declared("Registry"), ContentRoot::Queue);
        assert_eq!(ContentRoot::from_declared(""), ContentRoot::Queue);
        assert_eq!(ContentRoot::Registry.as_str(), "registry");
    }
}

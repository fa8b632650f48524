//! Mapping interpreted scripts onto configuration documents

use std::path::{Path, PathBuf};
use tracing::debug;

use hbg_config::paths::yaml_file_name;
use hbg_manifest::constants::{
    HIPPOSYS_BATCHSIZE, HIPPOSYS_DESCRIPTION, HIPPOSYS_DRYRUN, HIPPOSYS_PARAMETERS, HIPPOSYS_PATH,
    HIPPOSYS_QUERY, HIPPOSYS_SCRIPT, HIPPOSYS_THROTTLE, HIPPOSYS_UPDATERINFO, JCR_PRIMARY_TYPE,
    UPDATE_PATH_PREFIX,
};
use hbg_manifest::{ConfigDocument, SequenceKey};

use crate::errors::ExtractError;
use crate::extractor::ScriptExtractor;
use crate::normalize::collapse_blank_lines;
use crate::script_class::ScriptClassModel;

/// Repository node of the updater: `/hippo:configuration/hippo:update/hippo:{root}/{name}`
pub fn node_path(model: &ScriptClassModel) -> String {
    format!(
        "{}{}/{}",
        UPDATE_PATH_PREFIX,
        model.contentroot().as_str(),
        model.name()
    )
}

/// Path to reload at deployment, only for scripts that ask for it
pub fn bootstrap_path(model: &ScriptClassModel) -> Option<String> {
    (model.reload() && model.is_valid()).then(|| node_path(model))
}

/// Script text as stored in the document
pub fn script_content(model: &ScriptClassModel) -> String {
    collapse_blank_lines(model.script())
}

/// Build the document for a valid, non-excluded script
pub fn document_for(model: &ScriptClassModel) -> Option<ConfigDocument> {
    if !model.is_valid() || model.is_excluded() {
        return None;
    }

    let mut document = ConfigDocument::new(node_path(model));
    document.insert(JCR_PRIMARY_TYPE, HIPPOSYS_UPDATERINFO);
    document.insert(HIPPOSYS_BATCHSIZE, model.batch_size());
    document.insert_non_empty(HIPPOSYS_DESCRIPTION, model.description());
    if model.dry_run() {
        document.insert(HIPPOSYS_DRYRUN, true);
    }
    document.insert_non_empty(HIPPOSYS_PARAMETERS, model.parameters());
    document.insert_non_empty(HIPPOSYS_PATH, model.path());
    document.insert_non_empty(HIPPOSYS_QUERY, model.xpath());
    document.insert(HIPPOSYS_SCRIPT, script_content(model));
    document.insert(HIPPOSYS_THROTTLE, model.throttle());
    Some(document)
}

/// Everything a generation run needs from one script
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltScript {
    pub source: PathBuf,
    pub document: ConfigDocument,
    /// Document path relative to the target directory, `/`-separated
    pub document_file: String,
    pub manifest_path: Option<String>,
    /// Action list the reload entry goes into
    pub action_key: SequenceKey,
}

/// Builds documents for scripts below one source directory
#[derive(Debug)]
pub struct DocumentBuilder {
    base_path: PathBuf,
    default_key: SequenceKey,
    extractor: ScriptExtractor,
}

impl DocumentBuilder {
    pub fn new(base_path: impl Into<PathBuf>, keep_line_count: bool) -> Self {
        DocumentBuilder {
            base_path: base_path.into(),
            default_key: SequenceKey::DEFAULT,
            extractor: ScriptExtractor::new(keep_line_count),
        }
    }

    pub fn with_default_key(mut self, key: SequenceKey) -> Self {
        self.default_key = key;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn extractor_mut(&mut self) -> &mut ScriptExtractor {
        &mut self.extractor
    }

    /// Document path for `file`, or `None` if it is not below the base path
    pub fn document_file_name(&self, file: &Path) -> Option<String> {
        yaml_file_name(&self.base_path, file)
    }

    /// Interpret `file` and build its document.
    ///
    /// `Ok(None)` covers skipped, invalid and excluded scripts. An invalid
    /// updater name is the only error.
    pub fn build(&mut self, file: &Path) -> Result<Option<BuiltScript>, ExtractError> {
        let Some(model) = self.extractor.interpreting_class(file)? else {
            return Ok(None);
        };
        let Some(document) = document_for(&model) else {
            debug!(
                "No document for {:?} (valid: {}, excluded: {})",
                file,
                model.is_valid(),
                model.is_excluded()
            );
            return Ok(None);
        };
        let Some(document_file) = self.document_file_name(file) else {
            debug!("{:?} is outside {:?}", file, self.base_path);
            return Ok(None);
        };

        Ok(Some(BuiltScript {
            source: file.to_path_buf(),
            manifest_path: bootstrap_path(&model),
            action_key: self.default_key,
            document,
            document_file,
        }))
    }

    pub fn build_document(&mut self, file: &Path) -> Result<Option<ConfigDocument>, ExtractError> {
        Ok(self.build(file)?.map(|built| built.document))
    }
}

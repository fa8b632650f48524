//! Annotation extraction and script interpretation
//!
//! For each script the extractor:
//! 1. captures the first Bootstrap and the first Updater annotation verbatim
//! 2. strips every occurrence of both from the script body
//! 3. reduces the stripped body to the bare declaration of its first class
//! 4. parses `imports + annotations + reduced body` and evaluates the result
//!    into a [`ScriptClassModel`]

use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::annotations::AnnotationKind;
use crate::errors::{ExtractError, SkipReason};
use crate::naming::NamespaceMapping;
use crate::parser::ParseContext;
use crate::scanner::{find_annotations, find_class_header, AnnotationSpan};
use crate::script_class::{ModelError, ScriptClassModel, ScriptFile};

/// The program handed to the front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticUnit {
    pub imports: Vec<String>,
    pub annotations: Vec<String>,
    pub body: String,
}

impl SyntheticUnit {
    pub fn render(&self) -> String {
        let mut text = String::new();
        for import in &self.imports {
            text.push_str(import);
            text.push('\n');
        }
        for annotation in &self.annotations {
            text.push_str(annotation);
            text.push('\n');
        }
        text.push_str(&self.body);
        text
    }
}

/// Everything extracted from one script's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub bootstrap_text: Option<String>,
    pub updater_text: Option<String>,
    pub stripped_body: String,
    pub synthetic: SyntheticUnit,
}

impl Extraction {
    pub fn is_annotated(&self) -> bool {
        self.bootstrap_text.is_some() || self.updater_text.is_some()
    }
}

/// Extract both annotations from normalized script text
pub fn extract(source: &str, keep_line_count: bool) -> Extraction {
    let spans = find_annotations(source);
    let first_text = |kind: AnnotationKind| {
        spans
            .iter()
            .find(|span| AnnotationKind::from_name(&span.name) == Some(kind))
            .map(|span| span.text(source).to_string())
    };
    let bootstrap_text = first_text(AnnotationKind::Bootstrap);
    let updater_text = first_text(AnnotationKind::Updater);

    let stripped_body = remove_annotations(source, &spans, keep_line_count);
    let synthetic = SyntheticUnit {
        imports: AnnotationKind::ALL
            .iter()
            .map(|kind| kind.import_statement())
            .collect(),
        annotations: bootstrap_text.iter().chain(&updater_text).cloned().collect(),
        body: interpretation_body(&stripped_body),
    };

    Extraction {
        bootstrap_text,
        updater_text,
        stripped_body,
        synthetic,
    }
}

/// Remove every Bootstrap and Updater annotation from `source`.
///
/// Applying this to its own output returns the output unchanged.
pub fn strip_annotations(source: &str, keep_line_count: bool) -> String {
    remove_annotations(source, &find_annotations(source), keep_line_count)
}

/// Reduce a stripped body to what the front end needs: `class Name {}` for
/// the first declared class.
///
/// Script statements, methods, imports and foreign annotations around the
/// class never reach the front end. A body without a class reduces to
/// nothing, which the front end rejects.
pub fn interpretation_body(stripped: &str) -> String {
    match find_class_header(stripped) {
        Some(header) => format!("{} {{}}", &stripped[header.keyword_start..header.name_end]),
        None => String::new(),
    }
}

/// Remove the Bootstrap and Updater spans, leaving every other annotation
fn remove_annotations(source: &str, spans: &[AnnotationSpan], keep_line_count: bool) -> String {
    let selected = spans
        .iter()
        .filter(|span| AnnotationKind::from_name(&span.name).is_some())
        .map(|span| (span.start, span.end));
    remove_ranges(source, selected, keep_line_count)
}

/// Cut byte ranges out of `source`.
///
/// A line left blank by the removal disappears entirely, or stays as an empty
/// line with `keep_line_count`. Line breaks inside a removed range are kept
/// only with `keep_line_count`.
fn remove_ranges(
    source: &str,
    ranges: impl IntoIterator<Item = (usize, usize)>,
    keep_line_count: bool,
) -> String {
    let bytes = source.as_bytes();
    let mut removed = vec![false; bytes.len()];
    let mut any = false;
    for (start, end) in ranges {
        removed[start..end].fill(true);
        any = true;
    }
    if !any {
        return source.to_string();
    }

    let mut result = Vec::with_capacity(bytes.len());
    let mut line_start = 0;
    for line in source.split_inclusive('\n') {
        let line_end = line_start + line.len();
        let has_newline = line.ends_with('\n');
        let content_end = if has_newline { line_end - 1 } else { line_end };
        let range = line_start..line_end;
        line_start = line_end;

        if !removed[range.clone()].contains(&true) {
            result.extend_from_slice(&bytes[range]);
            continue;
        }

        let kept: Vec<u8> = (range.start..content_end)
            .filter(|&i| !removed[i])
            .map(|i| bytes[i])
            .collect();
        let blank = kept.iter().all(u8::is_ascii_whitespace);
        if !blank {
            result.extend_from_slice(&kept);
        }
        let newline_removed = has_newline && removed[content_end];
        if has_newline && (keep_line_count || (!blank && !newline_removed)) {
            result.push(b'\n');
        }
    }

    // Ranges start and end on character boundaries, so no character is ever split
    String::from_utf8_lossy(&result).into_owned()
}

/// State shared by all files of one run
#[derive(Debug)]
pub struct ExtractionContext {
    pub parser: ParseContext,
    pub namespaces: NamespaceMapping,
    pub keep_line_count: bool,
}

impl ExtractionContext {
    pub fn new(keep_line_count: bool) -> Self {
        ExtractionContext {
            parser: ParseContext::new(),
            namespaces: NamespaceMapping::new(),
            keep_line_count,
        }
    }

    /// Prepare for the next file
    pub fn reset(&mut self) {
        self.parser.reset();
    }
}

/// Outcome of interpreting one script
#[derive(Debug)]
pub enum Interpreted {
    Class(Box<ScriptClassModel>),
    Skipped(SkipReason),
}

/// Turns script files into [`ScriptClassModel`]s
#[derive(Debug)]
pub struct ScriptExtractor {
    context: ExtractionContext,
}

impl ScriptExtractor {
    pub fn new(keep_line_count: bool) -> Self {
        ScriptExtractor::with_context(ExtractionContext::new(keep_line_count))
    }

    pub fn with_context(context: ExtractionContext) -> Self {
        ScriptExtractor { context }
    }

    pub fn context(&self) -> &ExtractionContext {
        &self.context
    }

    /// Read and interpret a script file
    pub fn interpret(&mut self, path: &Path) -> Result<Interpreted, ExtractError> {
        match ScriptFile::read(path) {
            Ok(file) => self.interpret_file(file),
            Err(e) => Ok(self.skip(path, e.into())),
        }
    }

    /// Interpret a script, treating every skip as "no result"
    pub fn interpreting_class(
        &mut self,
        path: &Path,
    ) -> Result<Option<ScriptClassModel>, ExtractError> {
        Ok(match self.interpret(path)? {
            Interpreted::Class(model) => Some(*model),
            Interpreted::Skipped(_) => None,
        })
    }

    /// Interpret a script whose content has already been read
    pub fn interpret_file(&mut self, file: ScriptFile) -> Result<Interpreted, ExtractError> {
        self.context.reset();

        let extraction = extract(file.content(), self.context.keep_line_count);
        if !extraction.is_annotated() {
            return Ok(self.skip(file.path(), SkipReason::NotAnnotated));
        }

        let unit = match self
            .context
            .parser
            .parse_unit(&extraction.synthetic.render())
        {
            Ok(unit) => unit,
            Err(e) => return Ok(self.skip(file.path(), e.into())),
        };

        let path = file.path().to_path_buf();
        match ScriptClassModel::from_unit(
            file,
            &unit,
            extraction.stripped_body,
            &self.context.namespaces,
        ) {
            Ok(model) => {
                debug!("Interpreted {:?} as class {}", path, model.class_name());
                Ok(Interpreted::Class(Box::new(model)))
            }
            Err(ModelError::Evaluation(e)) => Ok(self.skip(&path, e.into())),
            Err(ModelError::InvalidName { name, source }) => Err(ExtractError::InvalidUpdaterName {
                path: absolute_path(&path),
                name,
                source,
            }),
        }
    }

    fn skip(&self, path: &Path, reason: SkipReason) -> Interpreted {
        debug!("Skipping {:?}: {}", path, reason);
        Interpreted::Skipped(reason)
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir().map_or_else(|_| path.to_path_buf(), |dir| dir.join(path))
}

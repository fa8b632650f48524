use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A malformed hierarchical name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("name is empty")]
    Empty,

    #[error("empty path segment at position {0}")]
    EmptySegment(usize),

    #[error("invalid namespace prefix '{prefix}' in '{segment}'")]
    InvalidPrefix { prefix: String, segment: String },

    #[error("invalid local name '{0}'")]
    InvalidLocalName(String),

    #[error("illegal character {character:?} in '{segment}'")]
    IllegalCharacter { character: char, segment: String },
}

/// The synthetic unit could not be tokenized or parsed
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        ParseError {
            line,
            message: message.into(),
        }
    }
}

/// Annotation arguments that do not fit the annotation's field schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("annotation @{0} cannot be resolved")]
    UnresolvedAnnotation(String),

    #[error("annotation @{0} is declared more than once")]
    DuplicateAnnotation(&'static str),

    #[error("@{annotation} has no field '{field}'")]
    UnknownField {
        annotation: &'static str,
        field: String,
    },

    #[error("@{annotation}.{field} is set more than once")]
    DuplicateField {
        annotation: &'static str,
        field: String,
    },

    #[error("@{annotation}.{field} expects {expected}, found {found}")]
    TypeMismatch {
        annotation: &'static str,
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("@{annotation} is missing required field '{field}'")]
    MissingField {
        annotation: &'static str,
        field: &'static str,
    },

    #[error("@{annotation}.{field} refers to unresolved constant '{name}'")]
    UnresolvedConstant {
        annotation: &'static str,
        field: &'static str,
        name: String,
    },
}

/// Why a script produced no result. None of these stop a generation run.
#[derive(Error, Debug)]
pub enum SkipReason {
    #[error("file cannot be read: {0}")]
    Unreadable(#[from] io::Error),

    #[error("no Bootstrap or Updater annotation found")]
    NotAnnotated,

    #[error("synthetic unit does not parse: {0}")]
    Syntax(#[from] ParseError),

    #[error("annotation values are invalid: {0}")]
    Evaluation(#[from] EvalError),
}

/// Errors that abort extraction and the generation run with it
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Error parsing the updater name for: {}", path.display())]
    InvalidUpdaterName {
        path: PathBuf,
        name: String,
        #[source]
        source: NameError,
    },
}

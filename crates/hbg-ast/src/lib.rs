//! Annotation extraction for Groovy updater scripts
//!
//! The pipeline for one script:
//! 1. Normalize line endings ([`normalize`])
//! 2. Locate the Bootstrap and Updater annotations with a lexically aware
//!    scanner ([`scanner`]) and build a synthetic unit ([`extractor`])
//! 3. Parse the synthetic unit ([`parser`]) and evaluate the annotation
//!    arguments against their field schemas ([`annotations`])
//! 4. Validate the updater name ([`naming`]) and wrap everything in a
//!    [`ScriptClassModel`]
//! 5. Map the model onto a configuration document ([`document`])
//!
//! Scripts that cannot be interpreted are skipped and logged at debug level.
//! Only a malformed updater name is reported as an error.

pub mod annotations;
pub mod discovery;
pub mod document;
pub mod errors;
pub mod extractor;
pub mod naming;
pub mod normalize;
pub mod parser;
pub mod scanner;
pub mod script_class;

pub use annotations::AnnotationKind;
pub use discovery::discover_scripts;
pub use document::{BuiltScript, DocumentBuilder};
pub use errors::{ExtractError, NameError, SkipReason};
pub use extractor::{extract, ExtractionContext, Interpreted, ScriptExtractor};
pub use script_class::{ScriptClassModel, ScriptFile};

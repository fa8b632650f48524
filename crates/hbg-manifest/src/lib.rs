//! Bootstrap manifest management
//!
//! This crate holds the output side of the generator: the per-script
//! configuration documents and the `hcm-actions.yaml` action manifest, together
//! with the merge algorithm that combines existing manifests with the reload
//! entries derived from a generation run.
//!
//! Both artifacts are written as block-style YAML.

pub mod actions;
pub mod constants;
pub mod document;
pub mod errors;
pub mod manifest_writer;
pub mod types;

pub use actions::collect_action_lists;
pub use document::ConfigDocument;
pub use errors::ManifestError;
pub use types::{Action, ActionEntry, ActionList, PropertyValue, SequenceKey};

// Re-export manifest writer utilities
pub use manifest_writer::{read_action_list, write_action_list, write_document};

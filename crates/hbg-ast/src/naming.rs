//! Validation of updater names against the JCR path grammar
//!
//! A name is one or more `/`-separated segments, each `[prefix:]localName`:
//! - `hippo:configuration/hippo:update` -> two prefixed segments
//! - `Fix broken links` -> one unprefixed segment
//! - `/abs`, `a//b`, `a:b:c` -> rejected

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::NameError;

/// Characters never allowed in a local name
const ILLEGAL_CHARACTERS: &[char] = &['/', ':', '[', ']', '|', '*'];

/// Prefix to namespace URI mapping used while validating names.
///
/// Starts out with the empty default mapping `"" -> ""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceMapping {
    prefixes: BTreeMap<String, String>,
}

impl Default for NamespaceMapping {
    fn default() -> Self {
        NamespaceMapping {
            prefixes: BTreeMap::from([(String::new(), String::new())]),
        }
    }
}

impl NamespaceMapping {
    pub fn new() -> Self {
        NamespaceMapping::default()
    }

    pub fn set_mapping(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), uri.into());
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.prefixes.contains_key(prefix)
    }

    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSegment {
    pub prefix: Option<String>,
    pub local_name: String,
    /// `None` for a prefix that is only resolved at deployment time
    pub namespace_uri: Option<String>,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// A validated relative name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JcrPath {
    segments: Vec<PathSegment>,
}

impl JcrPath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for JcrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Validate `name` and split it into segments
pub fn validate_name(name: &str, namespaces: &NamespaceMapping) -> Result<JcrPath, NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    let mut segments = Vec::new();
    for (position, segment) in name.split('/').enumerate() {
        if segment.is_empty() {
            return Err(NameError::EmptySegment(position));
        }
        segments.push(parse_segment(segment, namespaces)?);
    }
    Ok(JcrPath { segments })
}

fn parse_segment(segment: &str, namespaces: &NamespaceMapping) -> Result<PathSegment, NameError> {
    let (prefix, local_name) = match segment.split_once(':') {
        Some((prefix, local)) => {
            if !is_ncname(prefix) {
                return Err(NameError::InvalidPrefix {
                    prefix: prefix.to_string(),
                    segment: segment.to_string(),
                });
            }
            (Some(prefix), local)
        }
        None => (None, segment),
    };

    validate_local_name(local_name, segment)?;

    Ok(PathSegment {
        prefix: prefix.map(str::to_string),
        local_name: local_name.to_string(),
        namespace_uri: namespaces.uri(prefix.unwrap_or_default()).map(str::to_string),
    })
}

fn validate_local_name(local: &str, segment: &str) -> Result<(), NameError> {
    if let Some(character) = local
        .chars()
        .find(|c| ILLEGAL_CHARACTERS.contains(c) || c.is_control())
    {
        return Err(NameError::IllegalCharacter {
            character,
            segment: segment.to_string(),
        });
    }
    let untrimmed = local.trim() != local;
    // `{uri}local` is the expanded form, which is not accepted here
    if local.is_empty() || local == "." || local == ".." || untrimmed || local.starts_with('{') {
        return Err(NameError::InvalidLocalName(local.to_string()));
    }
    Ok(())
}

/// XML non-colonized name
fn is_ncname(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

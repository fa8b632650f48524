//! Per-script configuration documents
//!
//! A document is a single-entry mapping from the updater's node path to its
//! ordered properties. The YAML text starts with one blank line before the
//! node path; consumers of the generated files rely on that layout.

use serde_yaml::{Mapping, Value};

use crate::errors::ManifestError;
use crate::types::PropertyValue;

/// Ordered property mapping for one updater node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    node_path: String,
    properties: Vec<(String, PropertyValue)>,
}

impl ConfigDocument {
    pub fn new(node_path: impl Into<String>) -> Self {
        ConfigDocument {
            node_path: node_path.into(),
            properties: Vec::new(),
        }
    }

    pub fn node_path(&self) -> &str {
        &self.node_path
    }

    /// Set a property, keeping the position of an existing one
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.properties.push((name, value)),
        }
    }

    /// Set a property unless the value is blank or an empty list
    pub fn insert_non_empty(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let value = value.into();
        if !value.is_empty() {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn properties(&self) -> &[(String, PropertyValue)] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn to_yaml_value(&self) -> Value {
        let mut properties = Mapping::new();
        for (name, value) in &self.properties {
            properties.insert(Value::String(name.clone()), property_to_value(value));
        }
        let mut root = Mapping::new();
        root.insert(
            Value::String(self.node_path.clone()),
            Value::Mapping(properties),
        );
        Value::Mapping(root)
    }

    /// Block-style YAML, preceded by one blank line
    pub fn to_yaml(&self) -> Result<String, ManifestError> {
        let body = serde_yaml::to_string(&self.to_yaml_value())?;
        Ok(format!("\n{}", body))
    }

    /// Parse a document previously produced by [`ConfigDocument::to_yaml`]
    pub fn from_yaml(content: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_yaml::from_str(content)?;
        let Value::Mapping(root) = value else {
            return Err(ManifestError::InvalidDocument(
                "document root must be a mapping".to_string(),
            ));
        };
        if root.len() != 1 {
            return Err(ManifestError::InvalidDocument(format!(
                "expected a single node path, found {} entries",
                root.len()
            )));
        }

        let mut document = None;
        for (path, properties) in root {
            let Value::String(path) = path else {
                return Err(ManifestError::InvalidDocument(
                    "node path must be a string".to_string(),
                ));
            };
            let mut parsed = ConfigDocument::new(path);
            match properties {
                Value::Null => {}
                Value::Mapping(properties) => {
                    for (name, value) in properties {
                        let Value::String(name) = name else {
                            return Err(ManifestError::InvalidDocument(
                                "property names must be strings".to_string(),
                            ));
                        };
                        let value = value_to_property(&name, value)?;
                        parsed.insert(name, value);
                    }
                }
                _ => {
                    return Err(ManifestError::InvalidDocument(
                        "properties must be a mapping".to_string(),
                    ))
                }
            }
            document = Some(parsed);
        }

        document.ok_or_else(|| ManifestError::InvalidDocument("empty document".to_string()))
    }
}

fn property_to_value(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::String(s) => Value::String(s.clone()),
        PropertyValue::Bool(b) => Value::Bool(*b),
        PropertyValue::Integer(i) => Value::Number((*i).into()),
        PropertyValue::StringList(items) => {
            Value::Sequence(items.iter().cloned().map(Value::String).collect())
        }
    }
}

fn value_to_property(name: &str, value: Value) -> Result<PropertyValue, ManifestError> {
    let unsupported = || {
        ManifestError::InvalidDocument(format!("unsupported value for property {}", name))
    };
    match value {
        Value::String(s) => Ok(PropertyValue::String(s)),
        Value::Bool(b) => Ok(PropertyValue::Bool(b)),
        Value::Number(n) => n.as_i64().map(PropertyValue::Integer).ok_or_else(unsupported),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(unsupported()),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(PropertyValue::StringList),
        _ => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    fn sample() -> ConfigDocument {
        let mut doc = ConfigDocument::new("/hippo:configuration/hippo:update/hippo:queue/Fix");
        doc.insert(JCR_PRIMARY_TYPE, HIPPOSYS_UPDATERINFO);
        doc.insert(HIPPOSYS_BATCHSIZE, 50_i64);
        doc.insert(HIPPOSYS_DRYRUN, true);
        doc.insert(HIPPOSYS_QUERY, "//element(*, hippo:document)");
        doc.insert(
            HIPPOSYS_SCRIPT,
            "package org.example\n\nclass Fix {\n  def x = 'a: b'\n}\n",
        );
        doc.insert("hipposys:tags", vec!["one".to_string(), "two: three".to_string()]);
        doc
    }

    #[test]
    fn test_yaml_starts_with_blank_line() -> Result<(), ManifestError> {
        let yaml = sample().to_yaml()?;
        assert!(yaml.starts_with("\n/hippo:configuration/hippo:update/hippo:queue/Fix:"));
        Ok(())
    }

    #[test]
    fn test_document_roundtrip_is_lossless() -> Result<(), ManifestError> {
        let doc = sample();
        let parsed = ConfigDocument::from_yaml(&doc.to_yaml()?)?;
        assert_eq!(parsed, doc);
        assert_eq!(parsed.property_names(), doc.property_names());
        Ok(())
    }

    #[test]
    fn test_insert_non_empty_skips_blank_values() {
        let mut doc = ConfigDocument::new("/a");
        doc.insert_non_empty(HIPPOSYS_DESCRIPTION, "   ");
        doc.insert_non_empty(HIPPOSYS_PATH, "");
        doc.insert_non_empty(HIPPOSYS_THROTTLE, 1000_i64);
        assert_eq!(doc.property_names(), vec![HIPPOSYS_THROTTLE]);

        doc.insert(HIPPOSYS_THROTTLE, 5_i64);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get(HIPPOSYS_THROTTLE), Some(&PropertyValue::Integer(5)));
    }

    #[test]
    fn test_from_yaml_rejects_unsupported_shapes() {
        assert!(ConfigDocument::from_yaml("\n/a:\n  x: 1.5\n").is_err());
        assert!(ConfigDocument::from_yaml("\n/a: {}\n/b: {}\n").is_err());
        assert!(ConfigDocument::from_yaml("- 1\n").is_err());
    }
}

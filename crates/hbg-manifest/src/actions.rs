//! `hcm-actions.yaml` handling
//!
//! The manifest has the shape
//!
//! ```yaml
//! action-lists:
//! - 0.1:
//!     /hippo:configuration/hippo:update/hippo:queue/Cleanup: reload
//! ```
//!
//! Keys may be written as integers or floats; both map onto [`SequenceKey`].

use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::{debug, info};

use crate::constants::{ACTION_LISTS_KEY, HCM_ACTIONS_NAME};
use crate::errors::ManifestError;
use crate::manifest_writer::read_action_list;
use crate::types::{Action, ActionEntry, ActionList, SequenceKey};

/// Combine the reload entries derived from a generation run with the manifests
/// found at the source root and the target root.
///
/// Lists are merged in the order derived, target, source, so entries written by
/// hand in the source manifest override generated ones. When the source
/// manifest is empty and nothing was derived the target manifest is left as it
/// is and `None` is returned.
pub fn collect_action_lists(
    source_dir: &Path,
    target_dir: &Path,
    derived: &ActionList,
) -> Result<Option<ActionList>, ManifestError> {
    let source = read_action_list(&source_dir.join(HCM_ACTIONS_NAME))?;

    if source.is_empty() && derived.is_empty() {
        debug!("No action lists derived or declared in source, target remains as is");
        return Ok(None);
    }

    let target = read_action_list(&target_dir.join(HCM_ACTIONS_NAME))?;
    info!(
        "Merging action lists: {} derived, {} target, {} source",
        derived.len(),
        target.len(),
        source.len()
    );

    Ok(ActionList::merge([derived, &target, &source]))
}

/// Build the YAML tree for an action manifest
pub fn to_yaml_value(list: &ActionList) -> Value {
    let sequence = list
        .entries
        .iter()
        .map(|entry| {
            let mut actions = Mapping::new();
            for (path, action) in &entry.actions {
                actions.insert(
                    Value::String(path.clone()),
                    Value::String(action.as_str().to_string()),
                );
            }
            let mut keyed = Mapping::new();
            keyed.insert(Value::Number(entry.key.value().into()), Value::Mapping(actions));
            Value::Mapping(keyed)
        })
        .collect();

    let mut root = Mapping::new();
    root.insert(
        Value::String(ACTION_LISTS_KEY.to_string()),
        Value::Sequence(sequence),
    );
    Value::Mapping(root)
}

/// Read an action manifest from its YAML tree.
///
/// A document without an `action-lists` key (or an empty file) is an empty list.
pub fn from_yaml_value(value: &Value) -> Result<ActionList, ManifestError> {
    let lists = match value {
        Value::Null => return Ok(ActionList::new()),
        Value::Mapping(root) => match root.get(ACTION_LISTS_KEY) {
            None | Some(Value::Null) => return Ok(ActionList::new()),
            Some(Value::Sequence(lists)) => lists,
            Some(_) => {
                return Err(ManifestError::InvalidManifest(format!(
                    "'{}' must be a sequence",
                    ACTION_LISTS_KEY
                )))
            }
        },
        _ => {
            return Err(ManifestError::InvalidManifest(
                "manifest root must be a mapping".to_string(),
            ))
        }
    };

    let mut list = ActionList::new();
    for item in lists {
        let Value::Mapping(keyed) = item else {
            return Err(ManifestError::InvalidManifest(
                "action list items must be mappings".to_string(),
            ));
        };
        for (key, actions) in keyed {
            let mut entry = ActionEntry::new(parse_key(key)?);
            match actions {
                Value::Null => {}
                Value::Mapping(actions) => {
                    for (path, action) in actions {
                        let (Value::String(path), Value::String(action)) = (path, action) else {
                            return Err(ManifestError::InvalidManifest(format!(
                                "actions under key {} must map paths to action names",
                                entry.key
                            )));
                        };
                        entry.actions.insert(path.clone(), Action::from(action.as_str()));
                    }
                }
                _ => {
                    return Err(ManifestError::InvalidManifest(format!(
                        "key {} must hold a mapping of actions",
                        entry.key
                    )))
                }
            }
            list.entries.push(entry);
        }
    }
    Ok(list)
}

fn parse_key(key: &Value) -> Result<SequenceKey, ManifestError> {
    let parsed = match key {
        Value::Number(n) => n.as_f64().and_then(SequenceKey::new),
        Value::String(s) => s.parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        ManifestError::InvalidManifest(format!("invalid action list key: {:?}", key))
    })
}

/// Serialize an action manifest to block-style YAML
pub fn to_yaml_string(list: &ActionList) -> Result<String, ManifestError> {
    Ok(serde_yaml::to_string(&to_yaml_value(list))?)
}

/// Parse an action manifest from YAML text
pub fn from_yaml_str(content: &str) -> Result<ActionList, ManifestError> {
    let value: Value = serde_yaml::from_str(content)?;
    from_yaml_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const QUEUE_A: &str = "/hippo:configuration/hippo:update/hippo:queue/A";

    #[test]
    fn test_yaml_roundtrip_preserves_keys_and_unknown_actions() -> Result<(), ManifestError> {
        let content = "action-lists:\n- 1:\n    /content/a: reload\n- 0.5:\n    /content/b: ignore\n";
        let list = from_yaml_str(content)?;
        assert_eq!(list.len(), 2);
        assert_eq!(list.entries[0].key.value(), 1.0);
        assert_eq!(
            list.entries[1].actions.get("/content/b"),
            Some(&Action::Other("ignore".to_string()))
        );

        let written = to_yaml_string(&list)?;
        assert!(written.starts_with("action-lists:"));
        assert_eq!(from_yaml_str(&written)?, list);
        Ok(())
    }

    #[test]
    fn test_missing_action_lists_is_empty() -> Result<(), ManifestError> {
        assert!(from_yaml_str("")?.is_empty());
        assert!(from_yaml_str("other: 1\n")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_manifest_shapes() {
        assert!(matches!(
            from_yaml_str("action-lists: 3\n"),
            Err(ManifestError::InvalidManifest(_))
        ));
        assert!(matches!(
            from_yaml_str("action-lists:\n- abc:\n    /a: reload\n"),
            Err(ManifestError::InvalidManifest(_))
        ));
        assert!(matches!(
            from_yaml_str("- 1\n- 2\n"),
            Err(ManifestError::InvalidManifest(_))
        ));
    }

    #[test]
    fn test_collect_without_anything_is_no_change() -> Result<(), ManifestError> {
        let temp_dir = TempDir::new()?;
        let source = temp_dir.path().join("src");
        let target = temp_dir.path().join("target");
        fs::create_dir_all(&source)?;
        fs::create_dir_all(&target)?;
        fs::write(
            target.join(HCM_ACTIONS_NAME),
            "action-lists:\n- 0.1:\n    /old: reload\n",
        )?;

        assert_eq!(collect_action_lists(&source, &target, &ActionList::new())?, None);
        Ok(())
    }

    #[test]
    fn test_collect_source_manifest_overrides_derived() -> Result<(), ManifestError> {
        let temp_dir = TempDir::new()?;
        let source = temp_dir.path().join("src");
        let target = temp_dir.path().join("target");
        fs::create_dir_all(&source)?;
        fs::create_dir_all(&target)?;
        fs::write(
            source.join(HCM_ACTIONS_NAME),
            format!("action-lists:\n- 0.1:\n    {}: delete\n", QUEUE_A),
        )?;
        fs::write(
            target.join(HCM_ACTIONS_NAME),
            "action-lists:\n- 2.0:\n    /old: reload\n",
        )?;

        let mut derived = ActionList::new();
        derived.insert(SequenceKey::DEFAULT, QUEUE_A, Action::Reload);
        derived.insert(SequenceKey::DEFAULT, "/other", Action::Reload);

        let merged = collect_action_lists(&source, &target, &derived)?.unwrap_or_default();
        assert_eq!(merged.len(), 2);
        let first = &merged.entries[0];
        assert_eq!(first.key, SequenceKey::DEFAULT);
        assert_eq!(first.actions.get(QUEUE_A), Some(&Action::Delete));
        assert_eq!(first.actions.get("/other"), Some(&Action::Reload));
        assert!(merged.entries[1].actions.contains_key("/old"));
        Ok(())
    }
}

//! Value types for the action manifest and configuration documents

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

// =============================================================================
// SEQUENCE KEY - Total order over finite rationals
// =============================================================================

/// Numeric key of an action list entry.
///
/// Keys define the order in which action lists are applied at deployment time,
/// so they are compared numerically and never as strings.
#[derive(Debug, Clone, Copy)]
pub struct SequenceKey(f64);

impl SequenceKey {
    /// Key used for reload entries that do not declare their own
    pub const DEFAULT: SequenceKey = SequenceKey(0.1);

    /// Returns `None` for NaN and infinities
    pub fn new(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // -0.0 and 0.0 are the same key
        Some(SequenceKey(if value == 0.0 { 0.0 } else { value }))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for SequenceKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SequenceKey {}

impl PartialOrd for SequenceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SequenceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for SequenceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for SequenceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .ok()
            .and_then(SequenceKey::new)
            .ok_or_else(|| format!("'{}' is not a valid sequence key", s))
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// Deployment action for one repository path.
///
/// Generated entries are always [`Action::Reload`]; verbs this crate does not
/// know are preserved as found in existing manifests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Reload,
    Delete,
    Append,
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Reload => "reload",
            Action::Delete => "delete",
            Action::Append => "append",
            Action::Other(verb) => verb,
        }
    }
}

impl From<&str> for Action {
    fn from(value: &str) -> Self {
        match value {
            "reload" => Action::Reload,
            "delete" => Action::Delete,
            "append" => Action::Append,
            other => Action::Other(other.to_string()),
        }
    }
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        Action::from(value.as_str())
    }
}

impl From<Action> for String {
    fn from(value: Action) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One keyed action list: `key -> {path -> action}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEntry {
    pub key: SequenceKey,
    pub actions: BTreeMap<String, Action>,
}

impl ActionEntry {
    pub fn new(key: SequenceKey) -> Self {
        ActionEntry {
            key,
            actions: BTreeMap::new(),
        }
    }
}

/// An ordered sequence of action entries as found in one manifest.
///
/// A list read from disk may repeat keys; [`ActionList::merge`] produces the
/// normalized form with one entry per key in ascending key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionList {
    pub entries: Vec<ActionEntry>,
}

impl ActionList {
    pub fn new() -> Self {
        ActionList::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Add `path -> action` under `key`, reusing the entry for that key if present
    pub fn insert(&mut self, key: SequenceKey, path: impl Into<String>, action: Action) {
        let idx = match self.entries.iter().position(|e| e.key == key) {
            Some(idx) => idx,
            None => {
                self.entries.push(ActionEntry::new(key));
                self.entries.len() - 1
            }
        };
        self.entries[idx].actions.insert(path.into(), action);
    }

    pub fn get(&self, key: SequenceKey) -> Option<&ActionEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Merge action lists in the given order.
    ///
    /// Entries sharing a key are unioned; for the same path under the same key
    /// the action from the later list wins. The same path under different keys
    /// is kept under each key. Returns `None` when every list is empty, which
    /// callers treat as "no change".
    pub fn merge<'a, I>(sequences: I) -> Option<ActionList>
    where
        I: IntoIterator<Item = &'a ActionList>,
    {
        let mut collected: BTreeMap<SequenceKey, BTreeMap<String, Action>> = BTreeMap::new();
        let mut seen_any = false;

        for list in sequences {
            for entry in &list.entries {
                seen_any = true;
                let target = collected.entry(entry.key).or_default();
                for (path, action) in &entry.actions {
                    target.insert(path.clone(), action.clone());
                }
            }
        }

        if !seen_any {
            return None;
        }

        Some(ActionList {
            entries: collected
                .into_iter()
                .map(|(key, actions)| ActionEntry { key, actions })
                .collect(),
        })
    }
}

// =============================================================================
// DOCUMENT PROPERTIES
// =============================================================================

/// Value of a single property in a configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Bool(bool),
    Integer(i64),
    StringList(Vec<String>),
}

impl PropertyValue {
    /// Blank strings and empty lists carry no information and are left out of
    /// generated documents
    pub fn is_empty(&self) -> bool {
        match self {
            PropertyValue::String(s) => s.trim().is_empty(),
            PropertyValue::StringList(items) => items.is_empty(),
            PropertyValue::Bool(_) | PropertyValue::Integer(_) => false,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::StringList(value)
    }
}

//! Nested configuration trees and their flattened form
//!
//! A configuration tree is a YAML mapping keyed by strings. Any value that is
//! not a non-empty mapping is a leaf: scalars, sequences, nulls and empty
//! mappings. Flattening keys every leaf by the path of segments leading to
//! it, in document order; unflattening rebuilds the tree.

use serde::{Serialize, Serializer};
use serde_yaml::{Mapping, Value};
use std::fmt;
use thiserror::Error;

/// Reasons a parsed document cannot be used as a configuration tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The document root is some other kind of value
    #[error("expected a mapping at the document root, found {0}")]
    NotAMapping(&'static str),

    /// A mapping below the given path has a non-string key
    #[error("mapping keys must be strings (non-string key under '{0}')")]
    NonStringKey(String),
}

/// Path from the root of a configuration tree to one of its leaves
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlatKey(Vec<String>);

impl FlatKey {
    /// Build a key from its path segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Path segments from the root
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Segments joined with `separator`
    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }

    /// Whether the key has no segments
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }
}

impl fmt::Display for FlatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join("."))
    }
}

/// Leaves of a configuration tree keyed by their path, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatConfig {
    entries: Vec<(FlatKey, Value)>,
}

impl FlatConfig {
    /// Empty flat configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of leaves
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no leaves
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Leaf stored under `key`
    pub fn get(&self, key: &FlatKey) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Insert a leaf, replacing the value in place if the key already exists
    pub fn insert(&mut self, key: FlatKey, value: Value) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Leaves in document order
    pub fn iter(&self) -> impl Iterator<Item = (&FlatKey, &Value)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// Leaves in document order, with mutable values
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&FlatKey, &mut Value)> {
        self.entries.iter_mut().map(|(key, value)| (&*key, value))
    }
}

impl FromIterator<(FlatKey, Value)> for FlatConfig {
    fn from_iter<T: IntoIterator<Item = (FlatKey, Value)>>(iter: T) -> Self {
        let mut flat = Self::new();
        for (key, value) in iter {
            flat.insert(key, value);
        }
        flat
    }
}

impl IntoIterator for FlatConfig {
    type Item = (FlatKey, Value);
    type IntoIter = std::vec::IntoIter<(FlatKey, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A nested configuration mapping whose keys are all strings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree(Mapping);

/// A configuration tree after environment overrides and settings references
/// have been resolved
pub type ResolvedConfig = ConfigTree;

impl ConfigTree {
    /// Empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Underlying YAML mapping
    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    /// Consume the tree into its YAML mapping
    pub fn into_mapping(self) -> Mapping {
        self.0
    }

    /// Value stored under a top-level key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Top-level keys in document order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().filter_map(Value::as_str)
    }

    /// Number of top-level keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the tree has no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten the tree into its leaves
    pub fn flatten(&self) -> FlatConfig {
        flatten(self)
    }
}

impl TryFrom<Value> for ConfigTree {
    type Error = TreeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Mapping(mapping) => {
                check_keys(&mapping, &FlatKey::default())?;
                Ok(Self(mapping))
            }
            other => Err(TreeError::NotAMapping(kind_of(&other))),
        }
    }
}

impl TryFrom<Mapping> for ConfigTree {
    type Error = TreeError;

    fn try_from(mapping: Mapping) -> Result<Self, Self::Error> {
        Self::try_from(Value::Mapping(mapping))
    }
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

fn check_keys(mapping: &Mapping, parent: &FlatKey) -> Result<(), TreeError> {
    for (key, value) in mapping {
        let Some(segment) = key.as_str() else {
            let location = if parent.is_empty() {
                "<root>".to_string()
            } else {
                parent.to_string()
            };
            return Err(TreeError::NonStringKey(location));
        };
        if let Value::Mapping(child) = value {
            check_keys(child, &parent.child(segment))?;
        }
    }
    Ok(())
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Flatten a configuration tree into `{path: leaf}` entries
///
/// Non-empty mappings are descended into; everything else, including empty
/// mappings, is kept as a leaf so that [`unflatten`] is an exact inverse.
pub fn flatten(tree: &ConfigTree) -> FlatConfig {
    let mut flat = FlatConfig::new();
    flatten_into(&tree.0, &FlatKey::default(), &mut flat);
    flat
}

fn flatten_into(mapping: &Mapping, parent: &FlatKey, flat: &mut FlatConfig) {
    for (key, value) in mapping {
        // Keys were checked when the tree was built
        let Some(segment) = key.as_str() else {
            continue;
        };
        let path = parent.child(segment);
        match value {
            Value::Mapping(child) if !child.is_empty() => flatten_into(child, &path, flat),
            leaf => flat.entries.push((path, leaf.clone())),
        }
    }
}

/// Rebuild a nested tree from flattened entries
///
/// Entries with an empty path are ignored. If one path is a strict prefix of
/// another, the entry that comes later wins.
pub fn unflatten(flat: FlatConfig) -> ConfigTree {
    let mut root = Mapping::new();
    for (key, value) in flat {
        insert_path(&mut root, key.segments(), value);
    }
    ConfigTree(root)
}

fn insert_path(node: &mut Mapping, path: &[String], value: Value) {
    match path {
        [] => {}
        [leaf] => {
            node.insert(Value::String(leaf.clone()), value);
        }
        [segment, rest @ ..] => {
            let slot = node
                .entry(Value::String(segment.clone()))
                .or_insert(Value::Null);
            if !slot.is_mapping() {
                *slot = Value::Mapping(Mapping::new());
            }
            if let Value::Mapping(child) = slot {
                insert_path(child, rest, value);
            }
        }
    }
}

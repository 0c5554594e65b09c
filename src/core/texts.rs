//! Ordered `key -> text` mapping.
//!
//! Extraction results, missing sets and dispatch batches all need a map that
//! remembers the order keys were first seen in, while letting a later
//! occurrence replace the value in place.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

/// Translations returned by a backend, indexed by key then language.
pub type Translations = BTreeMap<String, BTreeMap<String, String>>;

/// Translations of a single text, indexed by language.
pub type LangTexts = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TextMap(IndexMap<String, String>);

impl TextMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. An overwritten key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Merge another map into this one, later values winning.
    pub fn extend_from(&mut self, other: TextMap) {
        self.0.extend(other.0);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TextMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

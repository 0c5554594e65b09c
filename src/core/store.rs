//! Per-language translation store.
//!
//! Each language lives in `<lang_dir>/<lang>.json`: a flat JSON object of
//! `key -> translated text`. Keys are opaque, so `pages.home.title` is stored as
//! one property, never as nested objects. Key order is preserved across
//! load/save; new keys are appended.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read translation file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed translation file {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Added,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct LanguageStore {
    language: String,
    path: PathBuf,
    entries: Map<String, Value>,
}

impl LanguageStore {
    /// Location of a language's document inside the language directory.
    pub fn path_for(lang_dir: &Path, language: &str) -> PathBuf {
        lang_dir.join(format!("{}.json", language))
    }

    /// An empty store that will be written to `path`.
    pub fn empty(language: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            language: language.into(),
            path: path.into(),
            entries: Map::new(),
        }
    }

    /// Load a language's store. A missing (or blank) file is an empty store.
    pub fn load(lang_dir: &Path, language: &str) -> Result<Self, StoreError> {
        let path = Self::path_for(lang_dir, language);
        let mut store = Self::empty(language, &path);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(store),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        if content.trim().is_empty() {
            return Ok(store);
        }

        let root: Value = serde_json::from_str(&content).map_err(|e| StoreError::Malformed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let Value::Object(entries) = root else {
            return Err(StoreError::Malformed {
                path,
                reason: "expected a JSON object at the top level".to_string(),
            });
        };

        if let Some((key, _)) = entries.iter().find(|(_, v)| !v.is_string()) {
            return Err(StoreError::Malformed {
                path,
                reason: format!("value for \"{}\" is not a string", key),
            });
        }

        store.entries = entries;
        Ok(store)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.as_str(), v)))
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> KeyAction {
        let value = value.into();
        match self.entries.get_mut(key) {
            Some(existing) if existing.as_str() == Some(value.as_str()) => KeyAction::Unchanged,
            Some(existing) => {
                *existing = Value::String(value);
                KeyAction::Updated
            }
            None => {
                self.entries.insert(key.to_string(), Value::String(value));
                KeyAction::Added
            }
        }
    }

    /// Pretty-printed document with a trailing newline.
    ///
    /// serde_json leaves `/` and non-ASCII characters unescaped.
    pub fn to_json_string(&self) -> Result<String> {
        let mut content =
            serde_json::to_string_pretty(&self.entries).context("Failed to serialize JSON")?;
        if !content.ends_with('\n') {
            content.push('\n');
        }
        Ok(content)
    }

    /// Replace the file on disk with the current contents.
    ///
    /// The document is written to a temporary file next to the target and
    /// renamed over it, so readers never see a half-written store.
    pub fn save(&self) -> Result<()> {
        let content = self.to_json_string()?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temp file in: {}", dir.display()))?;
        tmp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write file: {}", self.path.display()))?;
        set_readable_permissions(tmp.as_file(), &self.path)?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write file: {}", self.path.display()))?;

        Ok(())
    }
}

/// Temp files are created owner-only; keep the replaced file's mode, or use 0644.
#[cfg(unix)]
fn set_readable_permissions(file: &fs::File, target: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(target)
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(0o644);
    file.set_permissions(fs::Permissions::from_mode(mode))
        .context("Failed to set file permissions")
}

#[cfg(not(unix))]
fn set_readable_permissions(_file: &fs::File, _target: &Path) -> Result<()> {
    Ok(())
}

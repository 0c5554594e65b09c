//! Diff extracted texts against the language stores and merge translations back.
//!
//! A run goes through scanning (done by the caller), diffing, dispatching and
//! merging. Every step reports through [`SyncReport`]; nothing here prints.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{
    TextMap, Translations,
    dispatch::{BatchDispatcher, BatchFailure, DispatchSettings, identity_translations},
    store::{KeyAction, LanguageStore, StoreError},
};
use crate::translators::Translator;

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Persist the merged stores.
    pub write: bool,
    /// Stop after diffing.
    pub dry_run: bool,
    /// Also treat keys whose source text drifted from the stored source value as missing.
    pub resync: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No translatable calls in the scanned files.
    NothingFound,
    /// Every managed store already has every key.
    UpToDate,
    /// Missing keys were computed but nothing was translated.
    DryRun,
    Synced,
}

/// Where a merged value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The fresh source text (source language, or no backend configured).
    Source,
    Translated,
    /// The backend returned nothing for this key and language; the key itself is stored.
    KeyFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub key: String,
    pub value: String,
    pub action: KeyAction,
    pub origin: Origin,
}

#[derive(Debug)]
pub struct LanguageUpdate {
    pub language: String,
    pub path: PathBuf,
    /// Keys that were added or whose value changed.
    pub changes: Vec<Change>,
    pub written: bool,
    pub write_error: Option<anyhow::Error>,
}

/// A managed language whose store could not be loaded. It is left untouched.
#[derive(Debug)]
pub struct LanguageFailure {
    pub language: String,
    pub error: StoreError,
}

#[derive(Debug)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    pub keys_found: usize,
    pub missing: TextMap,
    pub load_failures: Vec<LanguageFailure>,
    pub updates: Vec<LanguageUpdate>,
    pub batch_failures: Vec<BatchFailure>,
    /// Name of the backend that served the run, if any.
    pub translator: Option<String>,
    pub batches: usize,
}

impl SyncReport {
    fn new(outcome: SyncOutcome, keys_found: usize) -> Self {
        Self {
            outcome,
            keys_found,
            missing: TextMap::new(),
            load_failures: Vec::new(),
            updates: Vec::new(),
            batch_failures: Vec::new(),
            translator: None,
            batches: 0,
        }
    }

    /// True when the run finished but some language or batch did not.
    pub fn has_failures(&self) -> bool {
        !self.load_failures.is_empty()
            || !self.batch_failures.is_empty()
            || self.updates.iter().any(|u| u.write_error.is_some())
    }
}

pub struct Synchronizer {
    lang_dir: PathBuf,
    source_language: String,
    languages: Vec<String>,
    options: SyncOptions,
    dispatcher: BatchDispatcher,
}

impl Synchronizer {
    /// `targets` are the languages to keep in sync; the source language is
    /// always managed as well.
    pub fn new(
        lang_dir: impl Into<PathBuf>,
        source_language: impl Into<String>,
        targets: &[String],
        options: SyncOptions,
        settings: DispatchSettings,
    ) -> Self {
        let source_language = source_language.into();
        let mut languages = vec![source_language.clone()];
        for lang in targets {
            if !languages.contains(lang) {
                languages.push(lang.clone());
            }
        }

        Self {
            lang_dir: lang_dir.into(),
            source_language,
            languages,
            options,
            dispatcher: BatchDispatcher::new(settings),
        }
    }

    pub fn lang_dir(&self) -> &Path {
        &self.lang_dir
    }

    /// Source language first, then the targets in configured order.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Run the pipeline for the texts extracted from the project.
    ///
    /// `resolve` is only called when there is something to translate, so a
    /// dry or up-to-date run never needs a working backend.
    pub fn run<T, F>(&self, source: &TextMap, resolve: F) -> Result<SyncReport>
    where
        T: Translator,
        F: FnOnce() -> Result<Option<T>>,
    {
        if source.is_empty() {
            return Ok(SyncReport::new(SyncOutcome::NothingFound, 0));
        }

        let mut report = SyncReport::new(SyncOutcome::UpToDate, source.len());
        let mut stores = Vec::new();
        for lang in &self.languages {
            match LanguageStore::load(&self.lang_dir, lang) {
                Ok(store) => stores.push(store),
                Err(error) => report.load_failures.push(LanguageFailure {
                    language: lang.clone(),
                    error,
                }),
            }
        }

        report.missing = self.diff(source, &stores);
        if report.missing.is_empty() {
            return Ok(report);
        }
        if self.options.dry_run {
            report.outcome = SyncOutcome::DryRun;
            return Ok(report);
        }

        let targets: Vec<String> = stores
            .iter()
            .map(|s| s.language().to_string())
            .filter(|lang| *lang != self.source_language)
            .collect();

        let mut from_backend = false;
        let translations = if targets.is_empty() {
            Translations::new()
        } else {
            match resolve()? {
                Some(translator) => {
                    let dispatch = self
                        .dispatcher
                        .dispatch(&report.missing, &self.source_language, &targets, &translator)
                        .with_context(|| {
                            format!("Translator '{}' failed", translator.name())
                        })?;
                    from_backend = true;
                    report.translator = Some(translator.name().to_string());
                    report.batches = dispatch.batches;
                    report.batch_failures = dispatch.failures;
                    dispatch.translations
                }
                None => identity_translations(&report.missing, &targets),
            }
        };

        for mut store in stores {
            let changes = self.merge(&mut store, &report.missing, &translations, from_backend);
            let mut update = LanguageUpdate {
                language: store.language().to_string(),
                path: store.path().to_path_buf(),
                changes,
                written: false,
                write_error: None,
            };
            if self.options.write {
                match store.save() {
                    Ok(()) => update.written = true,
                    Err(e) => update.write_error = Some(e),
                }
            }
            report.updates.push(update);
        }

        report.outcome = SyncOutcome::Synced;
        Ok(report)
    }

    /// Keys absent from any loaded store, plus drifted keys in resync mode.
    fn diff(&self, source: &TextMap, stores: &[LanguageStore]) -> TextMap {
        let source_store = stores
            .iter()
            .find(|s| s.language() == self.source_language);

        source
            .iter()
            .filter(|(key, value)| {
                let absent = stores.iter().any(|store| !store.contains_key(key));
                let drifted = self.options.resync
                    && source_store
                        .and_then(|store| store.get(key))
                        .is_some_and(|stored| stored != *value);
                absent || drifted
            })
            .collect()
    }

    fn merge(
        &self,
        store: &mut LanguageStore,
        missing: &TextMap,
        translations: &Translations,
        from_backend: bool,
    ) -> Vec<Change> {
        let is_source = store.language() == self.source_language;
        let mut changes = Vec::new();

        for (key, source_value) in missing.iter() {
            let (value, origin) = if is_source {
                (source_value, Origin::Source)
            } else {
                match translations.get(key).and_then(|t| t.get(store.language())) {
                    Some(text) if from_backend => (text.as_str(), Origin::Translated),
                    Some(text) => (text.as_str(), Origin::Source),
                    None => (key, Origin::KeyFallback),
                }
            };

            let action = store.set(key, value);
            if action != KeyAction::Unchanged {
                changes.push(Change {
                    key: key.to_string(),
                    value: value.to_string(),
                    action,
                    origin,
                });
            }
        }
        changes
    }
}

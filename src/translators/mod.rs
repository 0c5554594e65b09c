//! Translation backends.
//!
//! A backend implements [`Translator`]: a mandatory single-text `translate` and
//! an optional bulk `translate_many`, which defaults to [`translate_each`].
//! [`Capability`] tells the dispatcher how the backend wants to be fed.
//!
//! Built-in backends are constructed by kind name through [`resolve_backend`]:
//! - `openai`: chat-completions model, batched by payload size
//! - `google`: Google Cloud Translation v2, one request per text and language

pub mod google;
pub mod openai;

#[cfg(test)]
pub(crate) mod test_server;

use std::{fmt, str::FromStr};

use anyhow::{Result, bail};
use enum_dispatch::enum_dispatch;
use thiserror::Error;

pub use google::GoogleTranslator;
pub use openai::OpenAiTranslator;

use crate::{
    config::{Config, TranslatorEntry},
    core::{LangTexts, TextMap, Translations},
};

#[derive(Debug, Error)]
pub enum TranslateError {
    /// Timeout, connection failure or an unexpected HTTP status. Worth retrying.
    #[error("request failed: {0}")]
    Transport(String),
    /// The backend answered but the payload was not the expected mapping.
    #[error("could not decode response: {0}")]
    Decode(String),
    /// The backend cannot serve any request (e.g. rejected credentials).
    #[error("{0}")]
    Fatal(String),
}

impl TranslateError {
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TranslateError::Fatal(_))
    }
}

/// How a backend prefers to receive work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// One `translate_many` call with every missing text.
    Bulk,
    /// `translate_many` per batch, batches bounded by the payload budget.
    Batched,
    /// `translate` once per text.
    Single,
}

#[enum_dispatch]
pub trait Translator {
    /// Identifier used in diagnostics.
    fn name(&self) -> &str;

    fn capability(&self) -> Capability {
        Capability::Single
    }

    /// Translate one text into every language in `to`.
    fn translate(&self, text: &str, from: &str, to: &[String])
    -> Result<LangTexts, TranslateError>;

    /// Translate a set of texts into every language in `to`.
    fn translate_many(
        &self,
        texts: &TextMap,
        from: &str,
        to: &[String],
    ) -> Result<Translations, TranslateError> {
        translate_each(self, texts, from, to)
    }
}

/// Loop-based `translate_many` for backends without a bulk endpoint.
pub fn translate_each<T: Translator + ?Sized>(
    translator: &T,
    texts: &TextMap,
    from: &str,
    to: &[String],
) -> Result<Translations, TranslateError> {
    let mut results = Translations::new();
    for (key, text) in texts.iter() {
        results.insert(key.to_string(), translator.translate(text, from, to)?);
    }
    Ok(results)
}

/// Built-in backend implementations.
#[enum_dispatch(Translator)]
#[derive(Debug)]
pub enum Backend {
    OpenAi(OpenAiTranslator),
    Google(GoogleTranslator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    OpenAi,
    Google,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::OpenAi, BackendKind::Google];

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::OpenAi => "openai",
            BackendKind::Google => "google",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(BackendKind::OpenAi),
            "google" => Ok(BackendKind::Google),
            _ => {
                let known: Vec<_> = BackendKind::ALL.iter().map(|k| k.as_str()).collect();
                bail!(
                    "Unknown translator '{}'. Expected a name from 'translators' or one of: {}",
                    s,
                    known.join(", ")
                )
            }
        }
    }
}

/// Pick the backend kind to use.
///
/// Order: explicit name, then the configured default, then the first entry in
/// the table, then none. A name that is not in the table is taken as a kind.
pub fn resolve_kind(
    explicit: Option<&str>,
    default: Option<&str>,
    table: &[TranslatorEntry],
) -> Result<Option<BackendKind>> {
    let lookup = |name: &str| -> Result<BackendKind> {
        let kind = table
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.kind.as_str())
            .unwrap_or(name);
        kind.parse()
    };

    if let Some(name) = explicit {
        return lookup(name).map(Some);
    }
    if let Some(name) = default {
        return lookup(name).map(Some);
    }
    match table.first() {
        Some(entry) => entry.kind.parse().map(Some),
        None => Ok(None),
    }
}

/// Resolve and construct the backend for a run.
pub fn resolve_backend(explicit: Option<&str>, config: &Config) -> Result<Option<Backend>> {
    let kind = resolve_kind(
        explicit,
        config.default_translator.as_deref(),
        &config.translators,
    )?;

    let backend = match kind {
        Some(BackendKind::OpenAi) => Some(OpenAiTranslator::new(config.openai.clone())?.into()),
        Some(BackendKind::Google) => Some(GoogleTranslator::new(config.google.clone())?.into()),
        None => None,
    };
    Ok(backend)
}

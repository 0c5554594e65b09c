//! Feeds missing texts to a translator under a payload budget.
//!
//! How the work is cut depends on the backend's [`Capability`]. Each unit of
//! work is retried on recoverable errors; a unit that keeps failing is recorded
//! as a [`BatchFailure`] and the remaining units still run.

use std::{thread, time::Duration};

use crate::{
    core::{LangTexts, TextMap, Translations},
    translators::{Capability, TranslateError, Translator},
    utils::char_len,
};

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Upper bound on the summed codepoint length of the values in one batch.
    pub max_payload_chars: usize,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_payload_chars: 10_000,
            max_attempts: 3,
            retry_backoff: Duration::from_millis(10),
        }
    }
}

/// A batch that produced nothing after every attempt.
#[derive(Debug)]
pub struct BatchFailure {
    pub keys: Vec<String>,
    pub attempts: u32,
    pub error: TranslateError,
}

#[derive(Debug, Default)]
pub struct Dispatch {
    pub translations: Translations,
    pub failures: Vec<BatchFailure>,
    /// Number of units of work sent to the backend.
    pub batches: usize,
}

pub struct BatchDispatcher {
    settings: DispatchSettings,
}

impl BatchDispatcher {
    pub fn new(settings: DispatchSettings) -> Self {
        Self { settings }
    }

    /// Translate `missing` from `from` into every language of `to`.
    ///
    /// Returns `Err` only for a fatal backend error; anything else is isolated
    /// to the batch it happened in.
    pub fn dispatch(
        &self,
        missing: &TextMap,
        from: &str,
        to: &[String],
        translator: &dyn Translator,
    ) -> Result<Dispatch, TranslateError> {
        let mut dispatch = Dispatch::default();
        if missing.is_empty() || to.is_empty() {
            return Ok(dispatch);
        }

        let batches = match translator.capability() {
            Capability::Bulk => vec![missing.clone()],
            Capability::Batched => partition(missing, self.settings.max_payload_chars),
            Capability::Single => missing
                .iter()
                .map(|(key, text)| [(key, text)].into_iter().collect())
                .collect(),
        };
        let single = translator.capability() == Capability::Single;

        for batch in batches {
            dispatch.batches += 1;
            let result = self.with_retries(|| {
                if single {
                    let (key, text) = batch.iter().next().unwrap_or_default();
                    let texts = translator.translate(text, from, to)?;
                    Ok(Translations::from([(key.to_string(), texts)]))
                } else {
                    translator.translate_many(&batch, from, to)
                }
            });

            match result {
                Ok(translated) => {
                    let requested = translated
                        .into_iter()
                        .filter(|(key, _)| batch.contains_key(key));
                    merge_translations(&mut dispatch.translations, requested);
                }
                Err((error, _)) if !error.is_recoverable() => return Err(error),
                Err((error, attempts)) => dispatch.failures.push(BatchFailure {
                    keys: batch.keys().map(str::to_string).collect(),
                    attempts,
                    error,
                }),
            }
        }

        Ok(dispatch)
    }

    fn with_retries<T>(
        &self,
        mut call: impl FnMut() -> Result<T, TranslateError>,
    ) -> Result<T, (TranslateError, u32)> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match call() {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_recoverable() || attempt >= max_attempts => {
                    return Err((e, attempt));
                }
                Err(_) => {
                    attempt += 1;
                    if !self.settings.retry_backoff.is_zero() {
                        thread::sleep(self.settings.retry_backoff);
                    }
                }
            }
        }
    }
}

/// Split `texts` into batches whose values sum to at most `budget` codepoints.
///
/// A pair is never split. A value longer than the budget gets a batch of its own.
pub fn partition(texts: &TextMap, budget: usize) -> Vec<TextMap> {
    let mut batches = Vec::new();
    let mut current = TextMap::new();
    let mut current_len = 0;

    for (key, text) in texts.iter() {
        let len = char_len(text);
        if current_len + len > budget && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.insert(key, text);
        current_len += len;
    }

    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

/// Union `incoming` into `into`. Languages are combined per key and a value
/// already present for a language is kept.
pub fn merge_translations(
    into: &mut Translations,
    incoming: impl IntoIterator<Item = (String, LangTexts)>,
) {
    for (key, texts) in incoming {
        let entry = into.entry(key).or_default();
        for (lang, text) in texts {
            entry.entry(lang).or_insert(text);
        }
    }
}

/// Every text unchanged in every language. Used when no backend is configured.
pub fn identity_translations(texts: &TextMap, languages: &[String]) -> Translations {
    texts
        .iter()
        .map(|(key, text)| {
            let by_lang = languages
                .iter()
                .map(|lang| (lang.clone(), text.to_string()))
                .collect();
            (key.to_string(), by_lang)
        })
        .collect()
}

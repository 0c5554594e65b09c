//! OpenAI chat-completions backend.
//!
//! Texts are sent as a JSON object of `key -> text`; the model is asked to
//! answer with `key -> {lang -> text}`. Models sometimes read dotted keys as
//! paths and reply with nested objects, so replies are flattened back into
//! dotted keys before use.

use std::{fmt, time::Duration};

use anyhow::{Context, Result, bail};
use reqwest::{StatusCode, blocking::Client};
use serde_json::{Map, Value, json};

use super::{Capability, TranslateError, Translator};
use crate::{
    config::OpenAiConfig,
    core::{LangTexts, TextMap, Translations},
};

pub struct OpenAiTranslator {
    client: Client,
    api_key: String,
    config: OpenAiConfig,
}

impl fmt::Debug for OpenAiTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiTranslator")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiTranslator {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let Some(api_key) = config.api_key.clone().filter(|k| !k.trim().is_empty()) else {
            bail!(
                "The openai translator requires an API key (set 'openai.apiKey' or OPENAI_API_KEY)"
            );
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Send one chat request and return the trimmed message content.
    fn complete(&self, system: &str, user: &str) -> Result<String, TranslateError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": 0,
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| TranslateError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TranslateError::Fatal(format!(
                "OpenAI rejected the request ({}); check the API key",
                status
            )));
        }
        if !status.is_success() {
            return Err(TranslateError::Transport(format!("OpenAI returned {}", status)));
        }

        let payload: Value = response
            .json()
            .map_err(|e| TranslateError::Decode(e.to_string()))?;

        Ok(payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or("{}")
            .trim()
            .to_string())
    }
}

impl Translator for OpenAiTranslator {
    fn name(&self) -> &str {
        "openai"
    }

    fn capability(&self) -> Capability {
        Capability::Batched
    }

    fn translate(
        &self,
        text: &str,
        from: &str,
        to: &[String],
    ) -> Result<LangTexts, TranslateError> {
        let content = self.complete(&single_prompt(from, to), text)?;
        parse_lang_texts(&content, to)
    }

    fn translate_many(
        &self,
        texts: &TextMap,
        from: &str,
        to: &[String],
    ) -> Result<Translations, TranslateError> {
        let input = serde_json::to_string_pretty(texts)
            .map_err(|e| TranslateError::Decode(e.to_string()))?;
        let content = self.complete(&batch_prompt(from, to), &input)?;
        parse_translations(&content, to)
    }
}

fn single_prompt(from: &str, to: &[String]) -> String {
    format!(
        "You are a helpful assistant that translates from {} into multiple languages: {}. \
         Reply ONLY with a valid JSON object (no markdown, no code blocks, no explanations), \
         where each property is the language code and the value is the translated text. \
         Preserve placeholders like :name, :count, or any text wrapped in colons (:) \
         exactly as they are. \
         IMPORTANT: Do NOT create nested objects. Return a flat JSON object.",
        from,
        to.join(", ")
    )
}

fn batch_prompt(from: &str, to: &[String]) -> String {
    format!(
        "You are a helpful assistant that translates JSON key-value pairs \
         from {} into multiple languages: {}. \
         Reply ONLY with a valid JSON object (no markdown, no code blocks, no explanations) \
         where each key from the input maps to an object of translations per language. \
         Preserve any placeholder like :name, :count, or any text wrapped in colons (:). \
         CRITICAL: Keep ALL keys EXACTLY as they appear in the input, including dots and numbers \
         (e.g., 'properties.parking_type', 'items.0.name'). \
         Do NOT interpret dots as nested objects. \
         Do NOT create any nested structure. Return keys as-is.",
        from,
        to.join(", ")
    )
}

fn parse_object(content: &str) -> Result<Map<String, Value>, TranslateError> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(TranslateError::Decode(format!(
            "expected a JSON object, got: {}",
            other
        ))),
        Err(e) => Err(TranslateError::Decode(format!("{} in: {}", e, content))),
    }
}

/// Parse a `{lang: text}` reply for a single text.
pub fn parse_lang_texts(content: &str, languages: &[String]) -> Result<LangTexts, TranslateError> {
    let flat = flatten_response(parse_object(content)?, languages);
    Ok(flat
        .into_iter()
        .filter_map(|(lang, value)| value.as_str().map(|text| (lang, text.to_string())))
        .collect())
}

/// Parse a `{key: {lang: text}}` reply for a batch.
pub fn parse_translations(
    content: &str,
    languages: &[String],
) -> Result<Translations, TranslateError> {
    let flat = flatten_response(parse_object(content)?, languages);
    let mut translations = Translations::new();
    for (key, value) in flat {
        let Value::Object(by_lang) = value else {
            continue;
        };
        let texts: LangTexts = by_lang
            .into_iter()
            .filter_map(|(lang, text)| text.as_str().map(|t| (lang, t.to_string())))
            .collect();
        if !texts.is_empty() {
            translations.insert(key, texts);
        }
    }
    Ok(translations)
}

/// Undo accidental nesting in a model reply.
///
/// `{"properties": {"parking_type": {"es": "Garaje"}}}` becomes
/// `{"properties.parking_type": {"es": "Garaje"}}`. An object whose keys are all
/// language codes is a leaf. Purely numeric keys at the top level are dropped,
/// but kept inside paths such as `items.0.name`.
pub fn flatten_response(map: Map<String, Value>, languages: &[String]) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(map, "", languages, &mut out);
    out
}

fn flatten_into(
    map: Map<String, Value>,
    prefix: &str,
    languages: &[String],
    out: &mut Map<String, Value>,
) {
    for (key, value) in map {
        if prefix.is_empty() && is_numeric_key(&key) {
            continue;
        }

        let full_key = if prefix.is_empty() {
            key
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Object(inner) if !inner.is_empty() && !is_language_map(&inner, languages) => {
                flatten_into(inner, &full_key, languages, out);
            }
            other => {
                out.insert(full_key, other);
            }
        }
    }
}

/// Plain numbers such as `0`, `12` or `-1.5`; words like `nan` or `inf` are keys.
fn is_numeric_key(key: &str) -> bool {
    key.chars().any(|c| c.is_ascii_digit())
        && key
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == '+')
}

fn is_language_map(map: &Map<String, Value>, languages: &[String]) -> bool {
    map.keys().all(|k| {
        languages.iter().any(|lang| lang == k)
            || (k.len() == 2 && k.chars().all(|c| c.is_ascii_alphabetic()))
    })
}

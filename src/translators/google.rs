//! Google Cloud Translation (v2) backend.

use std::{fmt, time::Duration};

use anyhow::{Context, Result, bail};
use reqwest::{StatusCode, blocking::Client};
use serde_json::{Value, json};

use super::{TranslateError, Translator};
use crate::{config::GoogleConfig, core::LangTexts};

pub struct GoogleTranslator {
    client: Client,
    api_key: String,
    config: GoogleConfig,
}

impl fmt::Debug for GoogleTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleTranslator")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl GoogleTranslator {
    pub fn new(config: GoogleConfig) -> Result<Self> {
        let Some(api_key) = config.api_key.clone().filter(|k| !k.trim().is_empty()) else {
            bail!(
                "The google translator requires an API key (set 'google.apiKey' or GOOGLE_TRANSLATE_API_KEY)"
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

    fn translate_one(&self, text: &str, from: &str, to: &str) -> Result<String, TranslateError> {
        let url = format!(
            "{}/language/translate/v2",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "q": text,
                "source": from,
                "target": to,
                "format": "text",
            }))
            .send()
            .map_err(|e| TranslateError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TranslateError::Fatal(format!(
                "Google Translate rejected the request ({}); check the API key",
                status
            )));
        }
        if !status.is_success() {
            return Err(TranslateError::Transport(format!(
                "Google Translate returned {}",
                status
            )));
        }

        let payload: Value = response
            .json()
            .map_err(|e| TranslateError::Decode(e.to_string()))?;
        parse_translated_text(&payload)
    }
}

impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
    }

    fn translate(
        &self,
        text: &str,
        from: &str,
        to: &[String],
    ) -> Result<LangTexts, TranslateError> {
        let mut results = LangTexts::new();
        for lang in to {
            results.insert(lang.clone(), self.translate_one(text, from, lang)?);
        }
        Ok(results)
    }
}

fn parse_translated_text(payload: &Value) -> Result<String, TranslateError> {
    payload
        .pointer("/data/translations/0/translatedText")
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| {
            TranslateError::Decode("response has no data.translations[0].translatedText".into())
        })
}

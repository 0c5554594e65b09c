use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::translators::BackendKind;

pub const CONFIG_FILE_NAME: &str = ".textsyncrc.json";

pub const DEFAULT_IGNORES: &[&str] = &[
    "vendor",
    "node_modules",
    "storage",
    "bootstrap/cache",
    "tests",
];

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_lang_path")]
    pub lang_path: String,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_translator: Option<String>,
    #[serde(default)]
    pub translators: Vec<TranslatorEntry>,
    #[serde(default = "default_max_payload_chars")]
    pub max_payload_chars: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub google: GoogleConfig,
}

/// A named entry in the translator table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranslatorEntry {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_openai_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_google_base_url")]
    pub base_url: String,
    #[serde(default = "default_google_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ignores() -> Vec<String> {
    DEFAULT_IGNORES.iter().map(|s| s.to_string()).collect()
}

fn default_extensions() -> Vec<String> {
    [".blade.php", ".php"].map(String::from).to_vec()
}

fn default_lang_path() -> String {
    "./lang".to_string()
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_languages() -> Vec<String> {
    ["en", "es"].map(String::from).to_vec()
}

fn default_max_payload_chars() -> usize {
    10_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    10
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_timeout_secs() -> u64 {
    60
}

fn default_google_base_url() -> String {
    "https://translation.googleapis.com".to_string()
}

fn default_google_timeout_secs() -> u64 {
    10
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
            base_url: default_openai_base_url(),
            timeout_secs: default_openai_timeout_secs(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_google_base_url(),
            timeout_secs: default_google_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            ignores: default_ignores(),
            extensions: default_extensions(),
            lang_path: default_lang_path(),
            source_language: default_source_language(),
            languages: default_languages(),
            default_translator: None,
            translators: Vec::new(),
            max_payload_chars: default_max_payload_chars(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            openai: OpenAiConfig::default(),
            google: GoogleConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for invalid glob patterns, an empty language list,
    /// zero budgets, or translator entries naming an unknown kind.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'ignores': \"{}\"", pattern)
                })?;
            }
        }

        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        if self.languages.is_empty() {
            bail!("'languages' must list at least one language");
        }

        if self.max_payload_chars == 0 {
            bail!("'maxPayloadChars' must be greater than 0");
        }

        if self.max_attempts == 0 {
            bail!("'maxAttempts' must be at least 1");
        }

        for entry in &self.translators {
            entry
                .kind
                .parse::<BackendKind>()
                .with_context(|| format!("Invalid translator entry '{}'", entry.name))?;
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

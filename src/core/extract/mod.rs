//! Translation key extraction.
//!
//! Scans raw text for `Text::get(...)`, `@text(...)` and `text(...)` calls and
//! builds an ordered `key -> source text` map.
//!
//! ## Precedence
//!
//! - A call with an explicit value (`text('key', 'Value')`) always sets the value,
//!   overwriting whatever an earlier occurrence set.
//! - A call without a value (`text('key')`) only contributes when the key has not
//!   been seen with an explicit value. Its text is synthesized from the key
//!   (`hello_mate` -> `Hello Mate`).
//!
//! Extraction is total: text without recognizable calls contributes nothing.

mod patterns;
mod unescape;


use rayon::prelude::*;

pub use unescape::unescape;

use self::patterns::{
    KEY_ONLY_CALL, KEY_VALUE_CALL, captured_key, captured_value, is_method_call,
};
use crate::{core::TextMap, utils::key_to_text};

/// Calls found in a single blob, in document order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BlobCalls {
    /// `(key, unescaped value)` from calls with an explicit value.
    pub with_value: Vec<(String, String)>,
    /// Keys from calls without a value.
    pub key_only: Vec<String>,
}

/// Find every recognized call in one blob.
pub fn scan_blob(content: &str) -> BlobCalls {
    let mut calls = BlobCalls::default();

    for caps in KEY_VALUE_CALL.captures_iter(content) {
        if is_method_call(content, &caps) {
            continue;
        }
        if let (Some(key), Some(value)) = (captured_key(&caps), captured_value(&caps)) {
            calls
                .with_value
                .push((key.to_string(), unescape(value)));
        }
    }

    for caps in KEY_ONLY_CALL.captures_iter(content) {
        if is_method_call(content, &caps) {
            continue;
        }
        if let Some(key) = captured_key(&caps) {
            calls.key_only.push(key.to_string());
        }
    }

    calls
}

/// Fold per-blob calls into one map, applying the precedence rules.
pub fn merge_calls(all_calls: impl IntoIterator<Item = BlobCalls>) -> TextMap {
    let mut texts = TextMap::new();
    for calls in all_calls {
        for (key, value) in calls.with_value {
            texts.insert(key, value);
        }
        for key in calls.key_only {
            if !texts.contains_key(&key) {
                let text = key_to_text(&key);
                texts.insert(key, text);
            }
        }
    }
    texts
}

/// Extract `key -> source text` from a sequence of blobs.
///
/// Blobs are scanned in parallel; results are folded in input order so that
/// "last occurrence wins" refers to the caller's ordering.
pub fn extract<S>(blobs: &[S]) -> TextMap
where
    S: AsRef<str> + Sync,
{
    let per_blob: Vec<BlobCalls> = blobs
        .par_iter()
        .map(|blob| scan_blob(blob.as_ref()))
        .collect();
    merge_calls(per_blob)
}

//! Call-site patterns recognized by the extractor.
//!
//! Three call spellings are recognized:
//! - `Text::get(...)`: static accessor
//! - `@text(...)`: Blade directive
//! - `text(...)`: free helper function, but not `$obj->text(...)`
//!
//! The `regex` crate has no backreferences, so "closed by the same quote that
//! opened it" is written as one alternative per quote style.

use std::sync::LazyLock;

use regex::{Captures, Regex};

const MARKERS: &str = r"(?P<marker>Text::get|@text|\btext)\(\s*";

/// `marker('key', 'value'` with either quote style on each argument.
/// The value may span lines and contain backslash-escaped characters.
pub static KEY_VALUE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        concat!(
            r"(?s){}",
            r#"(?:'(?P<sq_key>[^']*)'|"(?P<dq_key>[^"]*)")"#,
            r"\s*,\s*",
            r#"(?:'(?P<sq_value>(?:\\.|[^'\\])*)'|"(?P<dq_value>(?:\\.|[^"\\])*)")"#,
        ),
        MARKERS
    );
    Regex::new(&pattern).unwrap()
});

/// `marker('key')` with a single-line key and no second argument.
pub static KEY_ONLY_CALL: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        concat!(
            r"{}",
            r#"(?:'(?P<sq_key>[^'"\n\r]*)'|"(?P<dq_key>[^'"\n\r]*)")"#,
            r"\s*\)",
        ),
        MARKERS
    );
    Regex::new(&pattern).unwrap()
});

/// Whether a match is a method call on an object rather than the free helper.
///
/// Only the bare `text(` marker is affected: `$view->text(...)` and
/// `$x?->text(...)` belong to some other API. A preceding `.` is string
/// concatenation, so `'Hi '.text(...)` is still the helper.
pub fn is_method_call(content: &str, caps: &Captures<'_>) -> bool {
    let Some(marker) = caps.name("marker") else {
        return false;
    };
    if marker.as_str() != "text" {
        return false;
    }
    let before = &content[..marker.start()];
    before.ends_with("->")
}

/// The key captured by whichever quote alternative matched.
pub fn captured_key<'a>(caps: &Captures<'a>) -> Option<&'a str> {
    caps.name("sq_key")
        .or_else(|| caps.name("dq_key"))
        .map(|m| m.as_str())
}

/// The raw (still escaped) value captured by whichever quote alternative matched.
pub fn captured_value<'a>(caps: &Captures<'a>) -> Option<&'a str> {
    caps.name("sq_value")
        .or_else(|| caps.name("dq_value"))
        .map(|m| m.as_str())
}

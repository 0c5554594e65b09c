//! Common utility functions shared across the codebase.

/// Turns a translation key into readable display text.
///
/// Uses the last dot-separated segment, replaces underscores with spaces and
/// uppercases the first letter of each word.
///
/// # Examples
///
/// ```
/// use textsync::utils::key_to_text;
///
/// assert_eq!(key_to_text("hello_mate"), "Hello Mate");
/// assert_eq!(key_to_text("pages.home.welcome_back"), "Welcome Back");
/// assert_eq!(key_to_text("auth.login"), "Login");
/// ```
pub fn key_to_text(key: &str) -> String {
    let last = key.rsplit('.').next().unwrap_or(key);
    last.replace('_', " ")
        .split(' ')
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Length of a text in Unicode scalar values, not bytes.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

//! textsync - keep per-language translation files in sync with the source
//!
//! textsync scans a project's PHP and Blade files for `Text::get(...)`,
//! `@text(...)` and `text(...)` calls, finds keys missing from the
//! `<lang>.json` files, translates them through a pluggable backend and merges
//! the results back.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction, stores, batching and synchronization
//! - `translators`: Translation backends
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod translators;
pub mod utils;

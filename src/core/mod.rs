//! Extraction and synchronization pipeline.
//!
//! 1. **Scan**: [`file_scanner`] lists the project files, [`context`] reads them
//! 2. **Extract**: [`extract`] turns file contents into an ordered `key -> text` map
//! 3. **Diff and merge**: [`sync`] compares it with each [`store`] and writes back
//! 4. **Translate**: [`dispatch`] feeds the missing texts to a translator

pub mod context;
pub mod dispatch;
pub mod extract;
pub mod file_scanner;
pub mod store;
pub mod sync;
mod texts;

pub use context::ScanContext;
pub use texts::{LangTexts, TextMap, Translations};

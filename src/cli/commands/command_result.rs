use std::path::PathBuf;

use super::super::exit_status::ExitStatus;
use crate::core::{context::UnreadableFile, sync::SyncReport};

#[derive(Debug)]
pub enum CommandSummary {
    Scan(ScanSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct ScanSummary {
    pub report: SyncReport,
    /// Number of source files that were read.
    pub files_scanned: usize,
    pub unreadable: Vec<UnreadableFile>,
    pub lang_dir: PathBuf,
    pub show_diff: bool,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
}

/// Result of running a textsync command.
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    pub status: ExitStatus,
}

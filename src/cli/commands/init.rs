use std::{fs, path::Path};

use anyhow::{Context, Result};

use super::super::exit_status::ExitStatus;
use super::{CommandResult, CommandSummary, InitSummary};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

pub fn init() -> Result<CommandResult> {
    init_in(Path::new("."))
}

pub fn init_in(dir: &Path) -> Result<CommandResult> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        return Ok(CommandResult {
            summary: CommandSummary::Init(InitSummary { created: false }),
            status: ExitStatus::Failure,
        });
    }

    fs::write(&config_path, default_config_json()?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    Ok(CommandResult {
        summary: CommandSummary::Init(InitSummary { created: true }),
        status: ExitStatus::Success,
    })
}

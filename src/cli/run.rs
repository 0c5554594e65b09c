use anyhow::{Result, bail};

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, init::init, scan::scan},
};

/// Dispatch to the handler of the parsed command.
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Scan(cmd)) => scan(cmd),
        Some(Command::Init) => init(),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}

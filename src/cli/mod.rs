use std::process::ExitCode;

use anyhow::Result;

pub mod args;
mod commands;
mod exit_status;
mod report;
mod run;

pub use args::{Arguments, Command};
pub use exit_status::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    let verbose = args.verbose();

    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success.into());
    };

    let result = run::run(args)?;
    report::print(&result, verbose);

    Ok(result.status.into())
}

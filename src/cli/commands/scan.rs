use std::time::Duration;

use anyhow::{Result, bail};

use super::super::{args::ScanCommand, exit_status::ExitStatus};
use super::{CommandResult, CommandSummary, ScanSummary};
use crate::{
    core::{
        ScanContext,
        dispatch::DispatchSettings,
        extract::extract,
        sync::{SyncOptions, Synchronizer},
    },
    translators::{resolve_backend, resolve_kind},
};

pub fn scan(cmd: ScanCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let ctx = ScanContext::new(&args.common)?;

    // Names are checked up front; the backend itself is built only when needed.
    resolve_kind(
        args.translator.as_deref(),
        ctx.config.default_translator.as_deref(),
        &ctx.config.translators,
    )?;

    if ctx.files.is_empty() {
        bail!(
            "No source files found in {} (extensions: {})",
            ctx.root_dir.display(),
            ctx.config.extensions.join(", ")
        );
    }

    let sources = ctx.read_sources();
    if sources.blobs.is_empty() {
        bail!(
            "None of the {} source file(s) could be read",
            sources.unreadable.len()
        );
    }

    let texts = extract(&sources.blobs);

    let targets = match &args.lang {
        Some(lang) => vec![lang.clone()],
        None => ctx.config.languages.clone(),
    };
    let options = SyncOptions {
        write: args.write,
        dry_run: args.dry,
        resync: args.resync,
    };
    let settings = DispatchSettings {
        max_payload_chars: ctx.config.max_payload_chars,
        max_attempts: ctx.config.max_attempts,
        retry_backoff: Duration::from_millis(ctx.config.retry_backoff_ms),
    };

    let lang_dir = ctx.lang_dir();
    let synchronizer = Synchronizer::new(
        &lang_dir,
        &ctx.config.source_language,
        &targets,
        options,
        settings,
    );
    let report = synchronizer.run(&texts, || {
        resolve_backend(args.translator.as_deref(), &ctx.config)
    })?;

    let status = if report.has_failures() {
        ExitStatus::Failure
    } else {
        ExitStatus::Success
    };

    Ok(CommandResult {
        summary: CommandSummary::Scan(ScanSummary {
            report,
            files_scanned: sources.blobs.len(),
            unreadable: sources.unreadable,
            lang_dir,
            show_diff: args.diff,
        }),
        status,
    })
}

//! Report formatting and printing.
//!
//! Progress and results go to stdout, problems to stderr. Kept apart from the
//! pipeline so the crate can be used as a library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{CommandResult, CommandSummary, InitSummary, ScanSummary};
use crate::config::CONFIG_FILE_NAME;
use crate::core::sync::{SyncOutcome, SyncReport};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Maximum number of keys listed per failed batch.
const MAX_KEYS_DISPLAY: usize = 5;

pub fn print(result: &CommandResult, verbose: bool) {
    print_to(
        result,
        verbose,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    );
}

pub fn print_to<O: Write, E: Write>(
    result: &CommandResult,
    verbose: bool,
    out: &mut O,
    err: &mut E,
) {
    match &result.summary {
        CommandSummary::Scan(summary) => print_scan(summary, verbose, out, err),
        CommandSummary::Init(summary) => print_init(summary, out, err),
    }
}

fn print_scan<O: Write, E: Write>(summary: &ScanSummary, verbose: bool, out: &mut O, err: &mut E) {
    let report = &summary.report;

    let _ = writeln!(out, "Scanning project for translation keys...");
    if verbose {
        let _ = writeln!(
            out,
            "Read {} source file(s); language files in {}",
            summary.files_scanned,
            summary.lang_dir.display()
        );
    }
    print_unreadable(summary, verbose, err);
    print_load_failures(report, err);

    if report.outcome == SyncOutcome::NothingFound {
        let _ = writeln!(out, "No translation keys found.");
        return;
    }
    let _ = writeln!(out, "Found {} unique keys.", report.keys_found);

    match report.outcome {
        SyncOutcome::NothingFound => {}
        SyncOutcome::UpToDate => {
            let _ = writeln!(out, "No new keys to translate.");
        }
        SyncOutcome::DryRun => print_dry_run(report, out),
        SyncOutcome::Synced => print_synced(summary, verbose, out, err),
    }
}

fn print_dry_run<O: Write>(report: &SyncReport, out: &mut O) {
    let _ = writeln!(out, "Dry run: these keys would be added:");
    let width = report
        .missing
        .keys()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);
    for (key, value) in report.missing.iter() {
        let padding = width - key.width();
        let _ = writeln!(out, "- {}:{} {}", key, " ".repeat(padding), value);
    }
    let _ = writeln!(out, "{} key(s) missing.", report.missing.len());
}

fn print_synced<O: Write, E: Write>(
    summary: &ScanSummary,
    verbose: bool,
    out: &mut O,
    err: &mut E,
) {
    let report = &summary.report;

    if verbose {
        match &report.translator {
            Some(name) => {
                let _ = writeln!(
                    out,
                    "Translated {} key(s) with {} in {} request batch(es).",
                    report.missing.len(),
                    name.cyan(),
                    report.batches
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "No translator configured; using source texts for {} key(s).",
                    report.missing.len()
                );
            }
        }
    }

    for failure in &report.batch_failures {
        let shown: Vec<&str> = failure
            .keys
            .iter()
            .take(if verbose { usize::MAX } else { MAX_KEYS_DISPLAY })
            .map(String::as_str)
            .collect();
        let more = failure.keys.len() - shown.len();
        let _ = writeln!(
            err,
            "{} Failed to translate {} key(s) after {} attempt(s): {}",
            "warning:".bold().yellow(),
            failure.keys.len(),
            failure.attempts,
            failure.error
        );
        let _ = writeln!(
            err,
            "  {} {}{}",
            "-->".blue(),
            shown.join(", "),
            if more > 0 {
                format!(" (+{} more)", more)
            } else {
                String::new()
            }
        );
    }

    for update in &report.updates {
        if summary.show_diff {
            let _ = writeln!(out, "Diff for {}:", update.language);
            for change in &update.changes {
                let _ = writeln!(
                    out,
                    "{}",
                    format!("+ \"{}\": \"{}\"", change.key, change.value).green()
                );
            }
        }

        if update.written {
            let _ = writeln!(
                out,
                "{} Translation file updated: {}",
                SUCCESS_MARK.green(),
                update.path.display()
            );
        } else if let Some(error) = &update.write_error {
            let _ = writeln!(
                err,
                "{} {} {:#}",
                FAILURE_MARK.red(),
                "error:".bold().red(),
                error
            );
        } else {
            let _ = writeln!(
                out,
                "Run with {} to save changes for {}.",
                "--write".cyan(),
                update.language
            );
        }
    }

    let _ = writeln!(out, "All translations processed.");
}

fn print_unreadable<E: Write>(summary: &ScanSummary, verbose: bool, err: &mut E) {
    if summary.unreadable.is_empty() {
        return;
    }
    if verbose {
        for file in &summary.unreadable {
            let _ = writeln!(
                err,
                "{} Cannot read {}: {}",
                "warning:".bold().yellow(),
                file.path.display(),
                file.error
            );
        }
    } else {
        let _ = writeln!(
            err,
            "{} {} file(s) could not be read (use {} for details)",
            "warning:".bold().yellow(),
            summary.unreadable.len(),
            "-v".cyan()
        );
    }
}

fn print_load_failures<E: Write>(report: &SyncReport, err: &mut E) {
    for failure in &report.load_failures {
        let _ = writeln!(
            err,
            "{} Skipping language '{}': {}",
            "warning:".bold().yellow(),
            failure.language,
            failure.error
        );
    }
}

fn print_init<O: Write, E: Write>(summary: &InitSummary, out: &mut O, err: &mut E) {
    if summary.created {
        let _ = writeln!(
            out,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else {
        let _ = writeln!(err, "Error: {} already exists", CONFIG_FILE_NAME);
    }
}

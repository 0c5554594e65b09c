use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): Command completed, every language is in sync
/// - `Failure` (1): Command completed, but a language file or batch failed
/// - `Error` (2): Command failed (config error, nothing to scan, fatal translator error)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    /// Command completed but some languages or batches were skipped.
    Failure,
    /// Command failed due to an error (invalid config, rejected credentials, etc.).
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}

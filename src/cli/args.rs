//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `scan`: Extract texts, find missing keys and update the language files
//! - `init`: Write a default `.textsyncrc.json`

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Scan(cmd)) => cmd.args.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project root to scan and to search for the config file from
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Language files directory (overrides config file)
    #[arg(long)]
    pub lang_path: Option<PathBuf>,

    /// Language the texts are written in (overrides config file)
    #[arg(long)]
    pub source_language: Option<String>,

    /// OpenAI API key (overrides config file)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Google Cloud Translation API key (overrides config file)
    #[arg(long, env = "GOOGLE_TRANSLATE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser)]
pub struct ScanArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Save the updated language files (default only previews)
    #[arg(long)]
    pub write: bool,

    /// List the keys that would be translated, without translating
    #[arg(long)]
    pub dry: bool,

    /// Only sync this language (plus the source language)
    #[arg(long)]
    pub lang: Option<String>,

    /// Print the values added to each language
    #[arg(long)]
    pub diff: bool,

    /// Re-translate keys whose source text changed
    #[arg(long)]
    pub resync: bool,

    /// Translator to use: a name from 'translators' or a kind (openai, google)
    #[arg(long)]
    pub translator: Option<String>,
}

#[derive(Debug, Args)]
pub struct ScanCommand {
    #[command(flatten)]
    pub args: ScanArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan the project and translate missing keys into every language file
    Scan(ScanCommand),
    /// Initialize a new .textsyncrc.json configuration file
    Init,
}

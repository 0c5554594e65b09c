use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use anyhow::{Result, bail};
use rayon::prelude::*;

use crate::{
    cli::args::CommonArgs,
    config::{Config, load_config},
    core::file_scanner::scan_files,
};

/// A source file that could not be read.
#[derive(Debug)]
pub struct UnreadableFile {
    pub path: PathBuf,
    pub error: std::io::Error,
}

/// Contents of the scanned files, in path order.
pub struct SourceBlobs {
    pub blobs: Vec<String>,
    pub unreadable: Vec<UnreadableFile>,
}

/// Settings and file list for one run.
///
/// Configuration is merged with the following priority (highest to lowest):
/// 1. CLI arguments (e.g., `--source-language en`)
/// 2. `.textsyncrc.json` config file
/// 3. Built-in defaults
pub struct ScanContext {
    pub config: Config,

    /// Project root directory (for resolving relative paths).
    pub root_dir: PathBuf,

    /// Files to extract texts from, sorted.
    pub files: Vec<PathBuf>,

    /// Paths the directory walk could not access.
    pub skipped_count: usize,

    pub verbose: bool,
}

impl ScanContext {
    pub fn new(common_args: &CommonArgs) -> Result<Self> {
        let verbose = common_args.verbose;
        let root_dir = common_args
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        if !root_dir.is_dir() {
            bail!("Source root is not a directory: {}", root_dir.display());
        }

        let config_result = load_config(&root_dir)?;
        if verbose && !config_result.from_file {
            eprintln!("Note: No .textsyncrc.json found, using default configuration");
        }

        let mut config = config_result.config;
        apply_overrides(&mut config, common_args);

        let scan_result = scan_files(
            &root_dir,
            &config.includes,
            &config.ignores,
            &config.extensions,
            verbose,
        );

        if scan_result.skipped_count > 0 {
            eprintln!(
                "Warning: {} path(s) skipped due to access errors{}",
                scan_result.skipped_count,
                if verbose { "" } else { " (use -v for details)" }
            );
        }

        Ok(Self {
            config,
            root_dir,
            files: scan_result.files.into_iter().collect(),
            skipped_count: scan_result.skipped_count,
            verbose,
        })
    }

    /// Read every scanned file in parallel, keeping path order.
    pub fn read_sources(&self) -> SourceBlobs {
        let results: Vec<_> = self
            .files
            .par_iter()
            .map(|path| (path, fs::read(path)))
            .collect();

        let mut sources = SourceBlobs {
            blobs: Vec::with_capacity(results.len()),
            unreadable: Vec::new(),
        };
        for (path, result) in results {
            match result {
                Ok(bytes) => sources
                    .blobs
                    .push(String::from_utf8_lossy(&bytes).into_owned()),
                Err(error) => sources.unreadable.push(UnreadableFile {
                    path: path.clone(),
                    error,
                }),
            }
        }
        sources
    }

    /// Language directory, resolved against the source root unless absolute.
    pub fn lang_dir(&self) -> PathBuf {
        let p = Path::new(&self.config.lang_path);
        if p.is_absolute() {
            return p.to_path_buf();
        }

        let is_cur_dir = self
            .root_dir
            .components()
            .all(|c| matches!(c, Component::CurDir));
        if is_cur_dir {
            p.to_path_buf()
        } else {
            let rel = p.strip_prefix(Path::new(".")).unwrap_or(p);
            self.root_dir.join(rel)
        }
    }
}

fn apply_overrides(config: &mut Config, args: &CommonArgs) {
    if let Some(ref lang) = args.source_language {
        config.source_language = lang.clone();
    }
    if let Some(ref lang_path) = args.lang_path {
        config.lang_path = lang_path.to_string_lossy().to_string();
    }
    if let Some(ref key) = args.openai_api_key {
        config.openai.api_key = Some(key.clone());
    }
    if let Some(ref key) = args.google_api_key {
        config.google.api_key = Some(key.clone());
    }
}

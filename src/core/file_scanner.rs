use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use colored::Colorize;
use glob::{Pattern, glob};
use walkdir::WalkDir;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning files.
pub struct ScanResult {
    /// Matching files, sorted so that later files win deterministically.
    pub files: BTreeSet<PathBuf>,
    pub skipped_count: usize,
}

pub fn scan_files(
    base_dir: &Path,
    includes: &[String],
    ignore_patterns: &[String],
    extensions: &[String],
    verbose: bool,
) -> ScanResult {
    let mut files = BTreeSet::new();
    let mut skipped_count = 0;

    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();

    for p in ignore_patterns {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(e) => {
                    if verbose {
                        eprintln!(
                            "{} Invalid ignore pattern '{}': {}",
                            "warning:".bold().yellow(),
                            p,
                            e
                        );
                    }
                }
            }
        } else {
            literal_ignore_paths.push(base_dir.join(p));
        }
    }

    let dirs_to_scan: Vec<PathBuf> = if includes.is_empty() {
        vec![base_dir.to_path_buf()]
    } else {
        let mut paths = Vec::new();
        for inc in includes {
            if is_glob_pattern(inc) {
                let full_pattern = base_dir.join(inc);
                match glob(&full_pattern.to_string_lossy()) {
                    Ok(entries) => paths.extend(entries.flatten().filter(|p| p.is_dir())),
                    Err(e) => {
                        if verbose {
                            eprintln!(
                                "{} Invalid glob pattern '{}': {}",
                                "warning:".bold().yellow(),
                                inc,
                                e
                            );
                        }
                    }
                }
            } else {
                let path = base_dir.join(inc);
                if path.exists() {
                    paths.push(path);
                } else if verbose {
                    eprintln!(
                        "{} Include path does not exist: {}",
                        "warning:".bold().yellow(),
                        path.display()
                    );
                }
            }
        }
        paths
    };

    for dir in dirs_to_scan {
        let walker = WalkDir::new(dir).into_iter().filter_entry(|entry| {
            !literal_ignore_paths
                .iter()
                .any(|ignore_path| entry.path().starts_with(ignore_path))
        });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    if verbose {
                        eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                    }
                    continue;
                }
            };
            let path = entry.path();

            if glob_patterns
                .iter()
                .any(|p| p.matches(&path.to_string_lossy()))
            {
                continue;
            }

            if entry.file_type().is_file() && has_extension(path, extensions) {
                files.insert(path.to_path_buf());
            }
        }
    }

    ScanResult {
        files,
        skipped_count,
    }
}

/// Suffix match on the file name, so `.blade.php` works as an extension.
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    extensions.iter().any(|ext| {
        let ext = ext.trim_start_matches('.');
        name.len() > ext.len() + 1
            && name.ends_with(ext)
            && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
    })
}

//! Archive file and directory loading.

use crate::parser::ArchiveParser;
use crate::progress::ProgressReporter;
use crate::types::{FileFailure, LoadReport, Record, RecordFormat};
use globset::{GlobBuilder, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};
use tweetrag_core::{AppError, AppResult};
use walkdir::WalkDir;

/// Glob used when a directory load names no pattern.
pub const DEFAULT_PATTERN: &str = "*.md";

/// Load every record from one markdown archive.
///
/// # Errors
/// `NotFound` when the path does not exist, `UnsupportedFormat` when it is
/// not a markdown file, `Io` when it cannot be read.
pub fn load_file(path: &Path) -> AppResult<Vec<Record>> {
    if !path.exists() {
        return Err(AppError::NotFound(path.display().to_string()));
    }

    if RecordFormat::from_path(path).is_none() {
        return Err(AppError::UnsupportedFormat(format!(
            "{} (only .md archives are supported)",
            path.display()
        )));
    }

    let text = fs::read_to_string(path)?;
    let source_file = path.display().to_string();
    let records: Vec<Record> = ArchiveParser::new(&text, &source_file).records().collect();

    tracing::info!(
        file = %path.display(),
        records = records.len(),
        "Loaded archive file"
    );

    Ok(records)
}

/// Load every archive in `dir` whose relative path matches `pattern`.
///
/// Matching files are loaded in path order. A file that fails to load is
/// logged, recorded in the report and skipped; only a missing directory or an
/// invalid pattern fails the whole call.
pub fn load_directory(
    dir: &Path,
    pattern: Option<&str>,
    progress: &ProgressReporter,
) -> AppResult<LoadReport> {
    if !dir.is_dir() {
        return Err(AppError::NotFound(format!("directory {}", dir.display())));
    }

    let pattern = pattern.unwrap_or(DEFAULT_PATTERN);
    let matcher = compile_pattern(pattern)?;
    let files = discover(dir, pattern, &matcher);

    let mut report = LoadReport::default();

    if files.is_empty() {
        tracing::info!(dir = %dir.display(), pattern, "No files matched pattern");
        return Ok(report);
    }

    let total = files.len() as u64;
    for (i, path) in files.iter().enumerate() {
        progress.load(i as u64 + 1, Some(total), &path.display().to_string());

        match load_file(path) {
            Ok(records) => {
                report.records.extend(records);
                report.files_loaded += 1;
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Skipping archive file");
                report.failures.push(FileFailure {
                    path: path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        dir = %dir.display(),
        files = report.files_loaded,
        failed = report.failures.len(),
        records = report.records.len(),
        "Loaded archive directory"
    );

    Ok(report)
}

fn compile_pattern(pattern: &str) -> AppResult<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| AppError::Config(format!("Invalid file pattern '{}': {}", pattern, e)))
}

/// Collect files under `dir` whose path relative to `dir` matches.
///
/// Symlinked archives are followed. Patterns without `/` or `**` only match
/// at the top level, so the walk stops there.
fn discover(dir: &Path, pattern: &str, matcher: &GlobMatcher) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    if !pattern.contains('/') && !pattern.contains("**") {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };

        if matcher.is_match(relative) {
            files.push(entry.into_path());
        } else {
            tracing::debug!(file = %relative.display(), "Skipping file not matching pattern");
        }
    }

    files.sort();
    files
}

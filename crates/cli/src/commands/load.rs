//! Load command handler.
//!
//! Parses an archive file or a directory of archives and ingests the posts.

use super::{open_store, print_json};
use clap::{ArgGroup, Args};
use std::path::PathBuf;
use std::sync::Arc;
use tweetrag_core::{config::AppConfig, AppError, AppResult};
use tweetrag_knowledge::{
    rag::ask::truncate_snippet, IngestReport, LoadReport, ProgressEvent, ProgressReporter, Record,
};

/// Records shown after parsing.
const SAMPLE_SIZE: usize = 3;

/// Characters of each sample record shown.
const PREVIEW_LENGTH: usize = 80;

/// Load an archive file or directory into the collection
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "dir"])))]
pub struct LoadCommand {
    /// Markdown archive to load
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Directory of archives to load
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Glob pattern for archives in --dir (default: *.md)
    #[arg(long, requires = "dir")]
    pub pattern: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl LoadCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing load command");
        tracing::debug!("Load options: {:?}", self);

        let mut store = open_store(config)?;
        if !self.json {
            store = store.with_progress(ProgressReporter::new(Arc::new(|event: ProgressEvent| {
                eprintln!("{}", event.format_simple());
            })));
        }

        let loaded = match (&self.file, &self.dir) {
            (Some(file), _) => LoadReport {
                records: store.load_file(file)?,
                files_loaded: 1,
                failures: Vec::new(),
            },
            (None, Some(dir)) => store.load_directory(dir, self.pattern.as_deref())?,
            (None, None) => {
                return Err(AppError::Config("Either --file or --dir is required".to_string()))
            }
        };

        if !self.json {
            print_summary(&loaded);
        }

        let report = store.ingest(&loaded.records).await?;

        if self.json {
            print_json(&serde_json::json!({
                "collection": config.collection,
                "filesLoaded": loaded.files_loaded,
                "recordsParsed": loaded.records.len(),
                "fileFailures": loaded.failures,
                "inserted": report.inserted,
                "skipped": report.skipped,
                "failures": report.failures,
            }))?;
        } else {
            print_report(&report);
        }

        Ok(())
    }
}

fn print_summary(loaded: &LoadReport) {
    println!(
        "Parsed {} posts from {} file(s)",
        loaded.records.len(),
        loaded.files_loaded
    );
    for failure in &loaded.failures {
        println!("  skipped {}: {}", failure.path.display(), failure.error);
    }

    for record in loaded.records.iter().take(SAMPLE_SIZE) {
        println!("{}", sample_line(record));
    }
    if loaded.records.len() > SAMPLE_SIZE {
        println!("... and {} more", loaded.records.len() - SAMPLE_SIZE);
    }
}

fn sample_line(record: &Record) -> String {
    let preview = truncate_snippet(&record.content, PREVIEW_LENGTH);
    match &record.timestamp {
        Some(timestamp) => format!("- {} ({})", preview, timestamp),
        None => format!("- {}", preview),
    }
}

fn print_report(report: &IngestReport) {
    println!(
        "Added {} posts ({} already present, {} failed)",
        report.inserted,
        report.skipped,
        report.failed()
    );
    for failure in &report.failures {
        println!("  {}: {}", failure.id, failure.error);
    }
}

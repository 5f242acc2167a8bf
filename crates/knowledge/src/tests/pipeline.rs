//! Load, ingest and clear through the store handle.

use super::mock_store;
use crate::types::{Record, RecordFormat};
use crate::{ArchiveParser, ProgressEvent, ProgressReporter, TweetStore};
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const TWO_SECTIONS: &str = "> Hello world\n\
                            [Mon Jan 01 00:00:00 +0000 2024](https://twitter.com/u/status/42)\n\
                            ----\n\
                            > Second tweet";

fn records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| Record {
            content: format!("distinct post number {} about topic{}", i, i),
            id: format!("{}", 1000 + i),
            timestamp: None,
            url: None,
            source_file: "tweets.md".to_string(),
            format: RecordFormat::Markdown,
        })
        .collect()
}

#[test]
fn test_two_section_archive() {
    let parsed: Vec<Record> = ArchiveParser::new(TWO_SECTIONS, "tweets.md")
        .records()
        .collect();

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].content, "Hello world");
    assert_eq!(parsed[0].id, "42");
    assert_eq!(
        parsed[0].timestamp.as_deref(),
        Some("Mon Jan 01 00:00:00 +0000 2024")
    );
    assert!(parsed[0].url.as_deref().unwrap().ends_with("/status/42"));
    assert_eq!(parsed[1].content, "Second tweet");
    assert_eq!(parsed[1].id, "md_1");
}

#[test]
fn test_parsing_twice_is_identical() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tweets.md");
    fs::write(&path, TWO_SECTIONS).unwrap();

    let store = mock_store(dir.path());
    assert_eq!(store.load_file(&path).unwrap(), store.load_file(&path).unwrap());
}

#[tokio::test]
async fn test_reingest_is_noop() {
    let dir = TempDir::new().unwrap();
    let mut store = mock_store(dir.path());
    let batch = records(5);

    let first = store.ingest(&batch).await.unwrap();
    assert_eq!(first.inserted, 5);
    assert_eq!(first.skipped, 0);

    let second = store.ingest(&batch).await.unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 5);

    assert_eq!(store.info().unwrap().document_count, 5);
}

#[tokio::test]
async fn test_directory_load_skips_other_formats() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("archive.md"), TWO_SECTIONS).unwrap();
    fs::write(data.join("notes.txt"), "> not an archive\n").unwrap();

    let mut store = mock_store(dir.path());

    let report = store.load_directory(&data, None).unwrap();
    assert_eq!(report.files_loaded, 1);
    assert_eq!(report.records.len(), 2);

    let everything = store.load_directory(&data, Some("*")).unwrap();
    assert_eq!(everything.records.len(), 2);
    assert_eq!(everything.failures.len(), 1);

    let ingested = store.ingest(&report.records).await.unwrap();
    assert_eq!(ingested.inserted, 2);
}

#[tokio::test]
async fn test_progress_reported_through_store() {
    let dir = TempDir::new().unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    let mut store = mock_store(dir.path()).with_progress(ProgressReporter::new(Arc::new(
        move |event: ProgressEvent| sink.lock().unwrap().push(event.format_simple()),
    )));
    store.ingest(&records(7)).await.unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].starts_with("[embed] 5/7"));
    assert!(events[1].starts_with("[embed] 7/7"));
}

#[tokio::test]
async fn test_clear() {
    let dir = TempDir::new().unwrap();
    let mut store = mock_store(dir.path());

    assert_eq!(store.clear().unwrap(), 0);
    assert_eq!(store.info().unwrap().document_count, 0);

    store.ingest(&records(3)).await.unwrap();
    assert_eq!(store.clear().unwrap(), 3);

    let info = store.info().unwrap();
    assert_eq!(info.document_count, 0);
    assert!(info.bound_model.is_none());
}

#[tokio::test]
async fn test_store_persists_across_handles() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = mock_store(dir.path());
        store.ingest(&records(2)).await.unwrap();
    }

    let store: TweetStore = mock_store(dir.path());
    let info = store.info().unwrap();
    assert_eq!(info.name, "tweets");
    assert_eq!(info.document_count, 2);
    assert_eq!(info.model_name, "trigram-v1");
    assert_eq!(info.bound_model.as_deref(), Some("trigram-v1"));
    assert!(info.persist_location.ends_with("index"));
    assert!(info.created_at.is_some());
}

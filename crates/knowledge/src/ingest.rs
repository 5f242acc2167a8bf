//! Ingestion pipeline: dedup, embed, store.

use crate::dedup::existing_ids;
use crate::embeddings::EmbeddingProvider;
use crate::progress::ProgressReporter;
use crate::types::{IndexEntry, IngestReport, ItemFailure, Record};
use crate::vector_index::VectorIndex;
use std::collections::HashSet;
use tweetrag_core::{AppError, AppResult};

/// Records between two embedding progress events.
pub const PROGRESS_INTERVAL: usize = 5;

/// Embed and store every record whose id is not yet in the collection.
///
/// Records are processed in input order. A record that fails to embed or
/// store is logged and reported in `failures`; the batch continues. The only
/// batch-level error is an embedding model that differs from the one the
/// collection is bound to.
pub async fn ingest(
    index: &mut dyn VectorIndex,
    embedder: &dyn EmbeddingProvider,
    records: &[Record],
    progress: &ProgressReporter,
) -> AppResult<IngestReport> {
    let model = embedder.model_name();
    let mut bound = ensure_model(index, model, AppError::Config)?;

    let seen = existing_ids(index);
    let mut report = IngestReport::default();

    let mut fresh = Vec::with_capacity(records.len());
    let mut batch_ids = HashSet::new();
    for record in records {
        if seen.contains(&record.id) || !batch_ids.insert(record.id.as_str()) {
            report.skipped += 1;
        } else {
            fresh.push(record);
        }
    }

    tracing::info!(
        collection = index.name(),
        new = fresh.len(),
        skipped = report.skipped,
        model,
        "Embedding records"
    );

    let total = fresh.len();
    for (i, record) in fresh.into_iter().enumerate() {
        match embed_and_store(index, embedder, record).await {
            Ok(()) => {
                report.inserted += 1;

                if !bound {
                    index.bind_model(model)?;
                    bound = true;
                }
            }
            Err(e) => {
                tracing::warn!(id = %record.id, error = %e, "Skipping record");
                report.failures.push(ItemFailure {
                    id: record.id.clone(),
                    error: e.to_string(),
                });
            }
        }

        let done = i + 1;
        if done % PROGRESS_INTERVAL == 0 || done == total {
            progress.embed(done as u64, Some(total as u64), model);
        }
    }

    tracing::info!(
        collection = index.name(),
        inserted = report.inserted,
        skipped = report.skipped,
        failed = report.failed(),
        "Ingest completed"
    );

    Ok(report)
}

async fn embed_and_store(
    index: &mut dyn VectorIndex,
    embedder: &dyn EmbeddingProvider,
    record: &Record,
) -> AppResult<()> {
    let vector = embedder.embed(&record.content).await?;
    index.add(&IndexEntry::from_record(record, vector))?;
    tracing::debug!(id = %record.id, "Stored record");
    Ok(())
}

/// Check that `model` may be used with the collection.
///
/// Returns whether the collection already has a bound model. A different
/// bound model is turned into an error by `on_mismatch`.
pub(crate) fn ensure_model(
    index: &dyn VectorIndex,
    model: &str,
    on_mismatch: impl FnOnce(String) -> AppError,
) -> AppResult<bool> {
    match index.collection_meta()?.embedding_model {
        Some(bound) if bound != model => Err(on_mismatch(format!(
            "Collection '{}' holds embeddings from model '{}', not '{}'",
            index.name(),
            bound,
            model
        ))),
        Some(_) => Ok(true),
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::MockProvider;
    use crate::index::SqliteIndex;
    use crate::types::RecordFormat;
    use crate::progress::ProgressEvent;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn record(id: &str, content: &str) -> Record {
        Record {
            content: content.to_string(),
            id: id.to_string(),
            timestamp: None,
            url: None,
            source_file: "tweets.md".to_string(),
            format: RecordFormat::Markdown,
        }
    }

    /// Fails on any text containing "poison".
    #[derive(Debug)]
    struct FlakyProvider(MockProvider);

    #[async_trait::async_trait]
    impl EmbeddingProvider for FlakyProvider {
        fn provider_name(&self) -> &str {
            "flaky"
        }

        fn model_name(&self) -> &str {
            self.0.model_name()
        }

        fn dimensions(&self) -> Option<usize> {
            self.0.dimensions()
        }

        async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
            if text.contains("poison") {
                return Err(AppError::Embedding("connection refused".to_string()));
            }
            self.0.embed(text).await
        }
    }

    #[tokio::test]
    async fn test_ingest_inserts_and_binds_model() {
        let dir = TempDir::new().unwrap();
        let mut index = SqliteIndex::get_or_create("tweets", dir.path()).unwrap();
        let embedder = MockProvider::new(32);

        let records = vec![record("1", "first post"), record("2", "second post")];
        let report = ingest(&mut index, &embedder, &records, &ProgressReporter::noop())
            .await
            .unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(index.count().unwrap(), 2);
        assert_eq!(
            index.collection_meta().unwrap().embedding_model.as_deref(),
            Some("trigram-v1")
        );

        let stored = index.get(None).unwrap();
        assert_eq!(stored.ids, vec!["tweet_1", "tweet_2"]);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_contained() {
        let dir = TempDir::new().unwrap();
        let mut index = SqliteIndex::get_or_create("tweets", dir.path()).unwrap();
        let embedder = FlakyProvider(MockProvider::new(32));

        let records = vec![
            record("1", "fine"),
            record("2", "poison pill"),
            record("3", "also fine"),
        ];
        let report = ingest(&mut index, &embedder, &records, &ProgressReporter::noop())
            .await
            .unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].id, "2");
        assert!(report.failures[0].error.contains("connection refused"));
        assert_eq!(index.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicates_within_batch_are_skipped() {
        let dir = TempDir::new().unwrap();
        let mut index = SqliteIndex::get_or_create("tweets", dir.path()).unwrap();
        let embedder = MockProvider::new(32);

        let records = vec![record("7", "original"), record("7", "same id again")];
        let report = ingest(&mut index, &embedder, &records, &ProgressReporter::noop())
            .await
            .unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped, 1);
        assert!(report.failures.is_empty());
        assert_eq!(index.get(None).unwrap().documents, vec!["original"]);
    }

    #[tokio::test]
    async fn test_model_mismatch_rejected_before_embedding() {
        let dir = TempDir::new().unwrap();
        let mut index = SqliteIndex::get_or_create("tweets", dir.path()).unwrap();

        ingest(
            &mut index,
            &MockProvider::new(32),
            &[record("1", "first")],
            &ProgressReporter::noop(),
        )
        .await
        .unwrap();

        let other = MockProvider::new(32).with_model("nomic-embed-text");
        let err = ingest(
            &mut index,
            &other,
            &[record("2", "second")],
            &ProgressReporter::noop(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(index.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_progress_every_interval() {
        let dir = TempDir::new().unwrap();
        let mut index = SqliteIndex::get_or_create("tweets", dir.path()).unwrap();
        let embedder = MockProvider::new(16);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let progress = ProgressReporter::new(Arc::new(move |event: ProgressEvent| {
            sink.lock().unwrap().push(event.current);
        }));

        let records: Vec<Record> = (0..12)
            .map(|i| record(&i.to_string(), &format!("post number {}", i)))
            .collect();
        ingest(&mut index, &embedder, &records, &progress)
            .await
            .unwrap();

        assert_eq!(*events.lock().unwrap(), vec![5, 10, 12]);
    }
}

//! Similarity search over a collection.

use crate::embeddings::EmbeddingProvider;
use crate::ingest::ensure_model;
use crate::types::SearchResult;
use crate::vector_index::VectorIndex;
use tweetrag_core::{AppError, AppResult};

/// Return the `k` stored posts nearest to `query`, nearest first.
///
/// The query is embedded with the same provider used at ingest time; a
/// provider whose model differs from the collection's bound model is
/// rejected. Any failure is a `Retrieval` error; there are no partial results.
pub async fn search(
    index: &dyn VectorIndex,
    embedder: &dyn EmbeddingProvider,
    query: &str,
    k: usize,
) -> AppResult<SearchResult> {
    tracing::info!(collection = index.name(), k, "Searching: {}", query);

    ensure_model(index, embedder.model_name(), AppError::Retrieval)
        .map_err(into_retrieval)?;

    let embedding = embedder
        .embed(query)
        .await
        .map_err(|e| AppError::Retrieval(format!("Failed to embed query: {}", e)))?;

    let result = index
        .query(&embedding, k)
        .map_err(|e| AppError::Retrieval(format!("Index query failed: {}", e)))?;

    tracing::debug!(
        "Retrieved {} documents (nearest distance: {:?})",
        result.documents.len(),
        result.distances.first()
    );

    Ok(SearchResult {
        query: query.to_string(),
        documents: result.documents,
        distances: Some(result.distances),
        metadatas: Some(result.metadatas),
    })
}

fn into_retrieval(e: AppError) -> AppError {
    match e {
        AppError::Retrieval(_) => e,
        other => AppError::Retrieval(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::MockProvider;
    use crate::index::SqliteIndex;
    use crate::types::{IndexEntry, Record, RecordFormat};
    use tempfile::TempDir;

    async fn seeded(dir: &TempDir, embedder: &MockProvider, posts: &[&str]) -> SqliteIndex {
        let mut index = SqliteIndex::get_or_create("tweets", dir.path()).unwrap();
        for (i, post) in posts.iter().enumerate() {
            let record = Record {
                content: post.to_string(),
                id: i.to_string(),
                timestamp: None,
                url: None,
                source_file: "tweets.md".to_string(),
                format: RecordFormat::Markdown,
            };
            let vector = embedder.embed(post).await.unwrap();
            index.add(&IndexEntry::from_record(&record, vector)).unwrap();
        }
        index.bind_model(embedder.model_name()).unwrap();
        index
    }

    #[tokio::test]
    async fn test_search_ranks_nearest_first() {
        let dir = TempDir::new().unwrap();
        let embedder = MockProvider::new(128);
        let index = seeded(
            &dir,
            &embedder,
            &[
                "sourdough bread baking weekend",
                "kubernetes cluster upgrade",
                "baking sourdough again",
            ],
        )
        .await;

        let result = search(&index, &embedder, "sourdough baking", 2).await.unwrap();

        assert_eq!(result.query, "sourdough baking");
        assert_eq!(result.documents.len(), 2);
        assert!(result.documents.iter().all(|d| d.contains("sourdough")));

        let distances = result.distances.unwrap();
        assert!(distances[0] <= distances[1]);
        assert_eq!(result.metadatas.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_k_larger_than_collection() {
        let dir = TempDir::new().unwrap();
        let embedder = MockProvider::new(64);
        let index = seeded(&dir, &embedder, &["only post here"]).await;

        let result = search(&index, &embedder, "post", 10).await.unwrap();
        assert_eq!(result.documents.len(), 1);
    }

    #[tokio::test]
    async fn test_search_rejects_other_model() {
        let dir = TempDir::new().unwrap();
        let embedder = MockProvider::new(64);
        let index = seeded(&dir, &embedder, &["hello there"]).await;

        let other = MockProvider::new(64).with_model("nomic-embed-text");
        let err = search(&index, &other, "hello", 1).await.unwrap_err();

        assert!(matches!(err, AppError::Retrieval(_)));
        assert!(err.to_string().contains("trigram-v1"));
    }

    #[tokio::test]
    async fn test_search_dimension_mismatch_is_retrieval_error() {
        let dir = TempDir::new().unwrap();
        let embedder = MockProvider::new(64);
        let index = seeded(&dir, &embedder, &["hello there"]).await;

        let err = search(&index, &MockProvider::new(32), "hello", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Retrieval(_)));
    }
}

//! Tweet archive retrieval-augmented generation.
//!
//! Parses markdown post archives, embeds each post, stores the vectors in a
//! local SQLite index and answers questions from the nearest posts.

pub mod dedup;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod loader;
pub mod parser;
pub mod progress;
pub mod rag;
pub mod status_link;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use index::SqliteIndex;
pub use loader::{load_directory, load_file, DEFAULT_PATTERN};
pub use parser::ArchiveParser;
pub use progress::{ProgressEvent, ProgressReporter};
pub use rag::{RagResponse, RagSourceRef};
pub use types::{
    CollectionInfo, EntryMetadata, FileFailure, IndexEntry, IngestReport, ItemFailure,
    LoadReport, Record, RecordFormat, SearchResult,
};
pub use vector_index::VectorIndex;

use std::path::Path;
use std::sync::Arc;
use tweetrag_core::AppResult;
use tweetrag_llm::LlmClient;

/// Default number of posts retrieved per query.
pub const DEFAULT_TOP_K: usize = 3;

/// Describe a collection: size, models and location.
pub fn collection_info(
    index: &dyn VectorIndex,
    embedder: &dyn EmbeddingProvider,
) -> AppResult<CollectionInfo> {
    let meta = index.collection_meta()?;

    Ok(CollectionInfo {
        name: index.name().to_string(),
        document_count: index.count()?,
        model_name: embedder.model_name().to_string(),
        persist_location: index.persist_location().to_path_buf(),
        bound_model: meta.embedding_model,
        created_at: Some(meta.created_at),
    })
}

/// Delete every entry in the collection, returning how many were removed.
pub fn clear_collection(index: &mut dyn VectorIndex) -> AppResult<usize> {
    let ids = index.get(None)?.ids;
    if ids.is_empty() {
        tracing::info!(collection = index.name(), "Collection already empty");
        return Ok(0);
    }

    let removed = index.delete(&ids)?;
    tracing::info!(collection = index.name(), removed, "Cleared collection");
    Ok(removed)
}

/// An open collection together with the provider its vectors come from.
///
/// Every pipeline operation goes through this handle; nothing is kept in
/// process-wide state.
pub struct TweetStore {
    index: Box<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    progress: ProgressReporter,
}

impl TweetStore {
    /// Wrap an index and an embedding provider.
    pub fn new(index: Box<dyn VectorIndex>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            index,
            embedder,
            progress: ProgressReporter::noop(),
        }
    }

    /// Open (or create) the named SQLite collection under `persist_location`.
    pub fn open(
        collection: &str,
        persist_location: &Path,
        embedding: &EmbeddingConfig,
    ) -> AppResult<Self> {
        let index = SqliteIndex::get_or_create(collection, persist_location)?;
        let embedder = create_provider(embedding)?;

        tracing::debug!(
            collection,
            provider = embedder.provider_name(),
            model = embedder.model_name(),
            "Opened tweet store"
        );

        Ok(Self::new(Box::new(index), embedder))
    }

    /// Report progress of loads and ingests through `progress`.
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// Parse one archive file.
    pub fn load_file(&self, path: &Path) -> AppResult<Vec<Record>> {
        loader::load_file(path)
    }

    /// Parse every archive in `dir` matching `pattern` (default `*.md`).
    pub fn load_directory(&self, dir: &Path, pattern: Option<&str>) -> AppResult<LoadReport> {
        loader::load_directory(dir, pattern, &self.progress)
    }

    /// Embed and store records not yet in the collection.
    pub async fn ingest(&mut self, records: &[Record]) -> AppResult<IngestReport> {
        ingest::ingest(
            self.index.as_mut(),
            self.embedder.as_ref(),
            records,
            &self.progress,
        )
        .await
    }

    /// Find the `k` posts nearest to `query`.
    pub async fn search(&self, query: &str, k: usize) -> AppResult<SearchResult> {
        rag::search(self.index.as_ref(), self.embedder.as_ref(), query, k).await
    }

    /// Answer `query` from the `k` nearest posts.
    pub async fn ask(
        &self,
        llm: &dyn LlmClient,
        generation_model: &str,
        query: &str,
        k: usize,
    ) -> AppResult<RagResponse> {
        rag::ask(
            self.index.as_ref(),
            self.embedder.as_ref(),
            llm,
            generation_model,
            query,
            k,
        )
        .await
    }

    pub fn info(&self) -> AppResult<CollectionInfo> {
        collection_info(self.index.as_ref(), self.embedder.as_ref())
    }

    /// Remove every entry from the collection.
    pub fn clear(&mut self) -> AppResult<usize> {
        clear_collection(self.index.as_mut())
    }
}

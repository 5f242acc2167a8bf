//! Vector index abstraction for archive entries.
//!
//! A collection is a named set of [`IndexEntry`] values keyed by id. Backends
//! store vectors verbatim and rank by cosine distance.

use crate::types::{EntryMetadata, IndexEntry};
use chrono::{DateTime, Utc};
use std::path::Path;
use tweetrag_core::AppResult;

/// Entries read back by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetResult {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<EntryMetadata>,
}

/// Nearest neighbours of a query vector, nearest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub distances: Vec<f32>,
    pub metadatas: Vec<EntryMetadata>,
}

/// Collection-level bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionMeta {
    /// Model the stored vectors came from; `None` while the collection is empty
    pub embedding_model: Option<String>,

    /// Vector length shared by every entry; `None` while the collection is empty
    pub dimension: Option<usize>,

    pub created_at: DateTime<Utc>,
}

/// Trait for vector index backends.
pub trait VectorIndex: Send {
    /// Collection name.
    fn name(&self) -> &str;

    /// Directory the collection persists under.
    fn persist_location(&self) -> &Path;

    /// Insert one entry. Fails if the id already exists or the vector length
    /// differs from the collection's.
    fn add(&mut self, entry: &IndexEntry) -> AppResult<()>;

    /// Read entries by id, or every entry when `ids` is `None`.
    ///
    /// Unknown ids are omitted from the result.
    fn get(&self, ids: Option<&[String]>) -> AppResult<GetResult>;

    /// Return up to `k` entries ordered by ascending cosine distance.
    fn query(&self, vector: &[f32], k: usize) -> AppResult<QueryResult>;

    /// Delete entries by id, returning how many were removed.
    fn delete(&mut self, ids: &[String]) -> AppResult<usize>;

    /// Number of stored entries.
    fn count(&self) -> AppResult<usize>;

    /// Collection bookkeeping (bound model, dimension, creation time).
    fn collection_meta(&self) -> AppResult<CollectionMeta>;

    /// Record the embedding model the collection's vectors come from.
    fn bind_model(&mut self, model: &str) -> AppResult<()>;
}

/// Cosine distance (`1 - cosine similarity`) between two vectors.
///
/// Mismatched lengths and zero vectors have similarity 0, so distance 1.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

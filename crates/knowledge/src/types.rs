//! Archive pipeline type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix that namespaces record ids inside the index.
pub const INDEX_ID_PREFIX: &str = "tweet_";

/// Archive format a record was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    Markdown,
}

impl RecordFormat {
    /// Detect the archive format from a file extension.
    ///
    /// Returns `None` for anything that is not an accepted archive extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("md") => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
        }
    }
}

/// One parsed archive entry, before embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Quoted text of the entry (never empty)
    pub content: String,

    /// Status id from the entry's link, or a positional `md_<n>` fallback
    pub id: String,

    /// Link text of the status link, when present
    pub timestamp: Option<String>,

    /// Status URL, when present
    pub url: Option<String>,

    /// File the record was read from
    pub source_file: String,

    /// Archive format
    pub format: RecordFormat,
}

impl Record {
    /// Primary key used for this record inside the index.
    pub fn index_id(&self) -> String {
        format!("{}{}", INDEX_ID_PREFIX, self.id)
    }
}

/// Metadata stored next to every index entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Un-namespaced record id (what the dedup tracker compares against)
    pub id: String,

    /// Content length in characters
    pub length: usize,

    pub source_file: String,

    pub format: RecordFormat,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&Record> for EntryMetadata {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            length: record.content.chars().count(),
            source_file: record.source_file.clone(),
            format: record.format,
            timestamp: record.timestamp.clone(),
            url: record.url.clone(),
        }
    }
}

/// A record after embedding, as stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Namespaced primary key (`tweet_<record id>`)
    pub id: String,

    /// Embedding vector
    pub vector: Vec<f32>,

    /// Copy of the record content
    pub document: String,

    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// Build the index entry for an embedded record.
    pub fn from_record(record: &Record, vector: Vec<f32>) -> Self {
        Self {
            id: record.index_id(),
            vector,
            document: record.content.clone(),
            metadata: EntryMetadata::from(record),
        }
    }
}

/// One record that could not be ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFailure {
    /// Record id that failed
    pub id: String,

    /// Error message
    pub error: String,
}

/// Outcome of an ingest batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Records embedded and written to the index
    pub inserted: usize,

    /// Records whose id was already present
    pub skipped: usize,

    /// Records that failed to embed or store
    pub failures: Vec<ItemFailure>,
}

impl IngestReport {
    /// Number of records that failed.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// One file that could not be loaded during a directory load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of a directory load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// Records from every loaded file, in file-name order
    pub records: Vec<Record>,

    /// Number of files that loaded successfully
    pub files_loaded: usize,

    /// Files that failed and were skipped
    pub failures: Vec<FileFailure>,
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,

    /// Matching documents, nearest first
    pub documents: Vec<String>,

    /// Distances aligned with `documents` (non-decreasing)
    pub distances: Option<Vec<f32>>,

    /// Metadata aligned with `documents`
    pub metadatas: Option<Vec<EntryMetadata>>,
}

/// Point-in-time description of a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub document_count: usize,

    /// Embedding model of the active provider
    pub model_name: String,

    pub persist_location: PathBuf,

    /// Model the stored vectors were produced with, if any are stored
    pub bound_model: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

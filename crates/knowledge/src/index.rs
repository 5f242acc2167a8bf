//! SQLite-backed vector index.
//!
//! Every collection under one persist location shares a single database file.
//! Vectors are stored as little-endian `f32` blobs and ranked by a full scan,
//! which is plenty for a personal archive.

use crate::types::{EntryMetadata, IndexEntry};
use crate::vector_index::{cosine_distance, CollectionMeta, GetResult, QueryResult, VectorIndex};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::{Path, PathBuf};
use tweetrag_core::{AppError, AppResult};

/// Database file created inside the persist location.
pub const INDEX_FILE_NAME: &str = "index.sqlite";

/// A collection stored in SQLite.
pub struct SqliteIndex {
    conn: Connection,
    name: String,
    persist_location: PathBuf,
}

impl std::fmt::Debug for SqliteIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteIndex")
            .field("name", &self.name)
            .field("persist_location", &self.persist_location)
            .finish()
    }
}

impl SqliteIndex {
    /// Open the named collection under `persist_location`, creating the
    /// directory, database and collection as needed.
    pub fn get_or_create(name: &str, persist_location: &Path) -> AppResult<Self> {
        std::fs::create_dir_all(persist_location).map_err(|e| {
            AppError::Index(format!(
                "Failed to create index directory {}: {}",
                persist_location.display(),
                e
            ))
        })?;

        let db_path = index_path(persist_location);
        let conn = Connection::open(&db_path)
            .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))?;

        init_schema(&conn)?;

        conn.execute(
            "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
            params![name, Utc::now().to_rfc3339()],
        )
        .map_err(|e| AppError::Index(format!("Failed to create collection '{}': {}", name, e)))?;

        tracing::debug!(collection = name, path = %db_path.display(), "Opened SQLite index");

        Ok(Self {
            conn,
            name: name.to_string(),
            persist_location: persist_location.to_path_buf(),
        })
    }

    fn stored_dimension(&self) -> AppResult<Option<usize>> {
        self.conn
            .query_row(
                "SELECT dimension FROM collections WHERE name = ?1",
                params![self.name],
                |row| row.get::<_, Option<i64>>(0),
            )
            .map(|d| d.map(|d| d as usize))
            .map_err(|e| AppError::Index(format!("Failed to read collection: {}", e)))
    }
}

/// Path of the database file for a persist location.
pub fn index_path(persist_location: &Path) -> PathBuf {
    persist_location.join(INDEX_FILE_NAME)
}

fn init_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY,
            embedding_model TEXT,
            dimension INTEGER,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entries (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            document TEXT NOT NULL,
            embedding BLOB NOT NULL,
            metadata TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        );
        "#,
    )
    .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))
}

impl VectorIndex for SqliteIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn persist_location(&self) -> &Path {
        &self.persist_location
    }

    fn add(&mut self, entry: &IndexEntry) -> AppResult<()> {
        if entry.vector.is_empty() {
            return Err(AppError::Index(format!("Entry {} has an empty vector", entry.id)));
        }

        let metadata_json = serde_json::to_string(&entry.metadata)?;
        let embedding_bytes = embedding_to_bytes(&entry.vector);

        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::Index(format!("Failed to start transaction: {}", e)))?;

        let dimension: Option<i64> = tx
            .query_row(
                "SELECT dimension FROM collections WHERE name = ?1",
                params![self.name],
                |row| row.get(0),
            )
            .map_err(|e| AppError::Index(format!("Failed to read collection: {}", e)))?;

        match dimension {
            Some(d) if d as usize != entry.vector.len() => {
                return Err(AppError::Index(format!(
                    "Vector length {} does not match collection dimension {}",
                    entry.vector.len(),
                    d
                )));
            }
            Some(_) => {}
            None => {
                tx.execute(
                    "UPDATE collections SET dimension = ?1 WHERE name = ?2",
                    params![entry.vector.len() as i64, self.name],
                )
                .map_err(|e| AppError::Index(format!("Failed to set dimension: {}", e)))?;
            }
        }

        tx.execute(
            "INSERT INTO entries (collection, id, document, embedding, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                self.name,
                entry.id,
                entry.document,
                embedding_bytes,
                metadata_json
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref f, _) if f.code == ErrorCode::ConstraintViolation => {
                AppError::Index(format!("Duplicate id: {}", entry.id))
            }
            e => AppError::Index(format!("Failed to insert entry {}: {}", entry.id, e)),
        })?;

        tx.commit()
            .map_err(|e| AppError::Index(format!("Failed to commit entry: {}", e)))?;

        Ok(())
    }

    fn get(&self, ids: Option<&[String]>) -> AppResult<GetResult> {
        let mut result = GetResult::default();

        match ids {
            None => {
                let mut stmt = self
                    .conn
                    .prepare(
                        "SELECT id, document, metadata FROM entries
                         WHERE collection = ?1 ORDER BY rowid",
                    )
                    .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

                let rows = stmt
                    .query_map(params![self.name], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                        ))
                    })
                    .map_err(|e| AppError::Index(format!("Failed to read entries: {}", e)))?;

                for row in rows {
                    let (id, document, metadata) =
                        row.map_err(|e| AppError::Index(format!("Failed to read entry: {}", e)))?;
                    result.ids.push(id);
                    result.documents.push(document);
                    result.metadatas.push(parse_metadata(&metadata)?);
                }
            }
            Some(ids) => {
                let mut stmt = self
                    .conn
                    .prepare(
                        "SELECT document, metadata FROM entries
                         WHERE collection = ?1 AND id = ?2",
                    )
                    .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

                for id in ids {
                    let row = stmt
                        .query_row(params![self.name, id], |row| {
                            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                        })
                        .optional()
                        .map_err(|e| AppError::Index(format!("Failed to read entry: {}", e)))?;

                    if let Some((document, metadata)) = row {
                        result.ids.push(id.clone());
                        result.documents.push(document);
                        result.metadatas.push(parse_metadata(&metadata)?);
                    }
                }
            }
        }

        Ok(result)
    }

    fn query(&self, vector: &[f32], k: usize) -> AppResult<QueryResult> {
        if k == 0 {
            return Ok(QueryResult::default());
        }

        if let Some(dimension) = self.stored_dimension()? {
            if dimension != vector.len() {
                return Err(AppError::Index(format!(
                    "Query vector length {} does not match collection dimension {}",
                    vector.len(),
                    dimension
                )));
            }
        }

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, document, embedding, metadata FROM entries
                 WHERE collection = ?1 ORDER BY rowid",
            )
            .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![self.name], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(|e| AppError::Index(format!("Failed to query entries: {}", e)))?;

        let mut scored = Vec::new();
        for row in rows {
            let (id, document, embedding, metadata) =
                row.map_err(|e| AppError::Index(format!("Failed to read entry: {}", e)))?;
            let distance = cosine_distance(vector, &bytes_to_embedding(&embedding)?);
            scored.push((id, document, distance, metadata));
        }

        // Stable sort keeps insertion order among equal distances
        scored.sort_by(|a, b| a.2.total_cmp(&b.2));
        scored.truncate(k);

        let mut result = QueryResult::default();
        for (id, document, distance, metadata) in scored {
            result.ids.push(id);
            result.documents.push(document);
            result.distances.push(distance);
            result.metadatas.push(parse_metadata(&metadata)?);
        }

        tracing::debug!(
            "Retrieved {} entries (requested top-{})",
            result.ids.len(),
            k
        );

        Ok(result)
    }

    fn delete(&mut self, ids: &[String]) -> AppResult<usize> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::Index(format!("Failed to start transaction: {}", e)))?;

        let mut removed = 0;
        for id in ids {
            removed += tx
                .execute(
                    "DELETE FROM entries WHERE collection = ?1 AND id = ?2",
                    params![self.name, id],
                )
                .map_err(|e| AppError::Index(format!("Failed to delete entry {}: {}", id, e)))?;
        }

        // An emptied collection accepts vectors from any model again
        let remaining: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM entries WHERE collection = ?1",
                params![self.name],
                |row| row.get(0),
            )
            .map_err(|e| AppError::Index(format!("Failed to count entries: {}", e)))?;
        if remaining == 0 {
            tx.execute(
                "UPDATE collections SET embedding_model = NULL, dimension = NULL WHERE name = ?1",
                params![self.name],
            )
            .map_err(|e| AppError::Index(format!("Failed to reset collection: {}", e)))?;
        }

        tx.commit()
            .map_err(|e| AppError::Index(format!("Failed to commit delete: {}", e)))?;

        Ok(removed)
    }

    fn count(&self) -> AppResult<usize> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM entries WHERE collection = ?1",
                params![self.name],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n as usize)
            .map_err(|e| AppError::Index(format!("Failed to count entries: {}", e)))
    }

    fn collection_meta(&self) -> AppResult<CollectionMeta> {
        let (embedding_model, dimension, created_at) = self
            .conn
            .query_row(
                "SELECT embedding_model, dimension, created_at FROM collections WHERE name = ?1",
                params![self.name],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .map_err(|e| AppError::Index(format!("Failed to read collection: {}", e)))?;

        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AppError::Index(format!("Invalid collection timestamp: {}", e)))?
            .with_timezone(&Utc);

        Ok(CollectionMeta {
            embedding_model,
            dimension: dimension.map(|d| d as usize),
            created_at,
        })
    }

    fn bind_model(&mut self, model: &str) -> AppResult<()> {
        self.conn
            .execute(
                "UPDATE collections SET embedding_model = ?1 WHERE name = ?2",
                params![model, self.name],
            )
            .map_err(|e| AppError::Index(format!("Failed to bind model: {}", e)))?;

        tracing::debug!(collection = %self.name, model, "Bound embedding model");
        Ok(())
    }
}

fn parse_metadata(json: &str) -> AppResult<EntryMetadata> {
    serde_json::from_str(json)
        .map_err(|e| AppError::Index(format!("Corrupt entry metadata: {}", e)))
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index("Invalid embedding bytes length".to_string()));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

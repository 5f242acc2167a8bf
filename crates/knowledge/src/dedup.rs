//! Already-ingested id tracking.

use crate::vector_index::VectorIndex;
use std::collections::HashSet;

/// Record ids already present in the collection.
///
/// Reads every entry's metadata on each call. A collection that cannot be
/// read is treated as empty so ingestion can still proceed.
pub fn existing_ids(index: &dyn VectorIndex) -> HashSet<String> {
    match index.get(None) {
        Ok(result) => result.metadatas.into_iter().map(|m| m.id).collect(),
        Err(e) => {
            tracing::warn!(
                collection = index.name(),
                error = %e,
                "Could not read existing ids, assuming empty collection"
            );
            HashSet::new()
        }
    }
}

//! Cross-module pipeline tests.

mod pipeline;

use crate::{EmbeddingConfig, TweetStore};
use std::path::Path;

/// Open a store backed by the mock embedder under `dir`.
fn mock_store(dir: &Path) -> TweetStore {
    TweetStore::open("tweets", &dir.join("index"), &EmbeddingConfig::mock(128)).unwrap()
}

//! Retrieval and retrieval-augmented answering over the archive.

pub mod ask;
pub mod search;
pub mod types;

pub use ask::{ask, build_prompt};
pub use search::search;
pub use types::{RagResponse, RagSourceRef};

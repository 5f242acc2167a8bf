//! Error types for tweetrag.
//!
//! One enum covers every failure category in the workspace. Categories line
//! up with how a failure is handled: argument errors (`NotFound`,
//! `UnsupportedFormat`, `Config`) propagate immediately, per-item errors
//! (`Embedding`) are collected into batch reports by the caller, and read-path
//! errors (`Retrieval`, `Generation`) surface to the immediate caller.

use thiserror::Error;

/// Unified error type for tweetrag.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A referenced file or directory does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// File extension is not an accepted archive format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A single embedding call failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index storage errors
    #[error("Index error: {0}")]
    Index(String),

    /// Search failed (query embedding or index query)
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// LLM provider transport errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Generation step failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = AppError::UnsupportedFormat("notes.txt".to_string());
        assert_eq!(err.to_string(), "Unsupported format: notes.txt");

        let err = AppError::NotFound("data/".to_string());
        assert_eq!(err.to_string(), "Not found: data/");
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AppError = parse_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}

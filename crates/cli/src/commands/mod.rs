//! Command handlers for the tweetrag CLI.
//!
//! Each subcommand lives in its own module; they share `open_store`.

pub mod ask;
pub mod chat;
pub mod clear;
pub mod info;
pub mod load;
pub mod search;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use clear::ClearCommand;
pub use info::InfoCommand;
pub use load::LoadCommand;
pub use search::SearchCommand;

use std::sync::Arc;
use std::time::Duration;
use tweetrag_core::{config::AppConfig, AppError, AppResult};
use tweetrag_knowledge::{EmbeddingConfig, TweetStore};
use tweetrag_llm::{create_client, LlmClient};

/// Open the configured collection.
pub fn open_store(config: &AppConfig) -> AppResult<TweetStore> {
    TweetStore::open(
        &config.collection,
        &config.persist_location(),
        &EmbeddingConfig::from(config),
    )
}

/// Create the generation client for the configured Ollama endpoint.
pub fn generation_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    create_client(
        "ollama",
        Some(&config.ollama_endpoint),
        Some(Duration::from_secs(config.request_timeout_secs)),
    )
    .map_err(AppError::Config)
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

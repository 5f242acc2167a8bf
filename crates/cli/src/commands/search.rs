//! Search command handler.

use super::{open_store, print_json};
use clap::Args;
use tweetrag_core::{config::AppConfig, AppResult};
use tweetrag_knowledge::{SearchResult, DEFAULT_TOP_K};

/// Show the posts nearest to a query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// Number of posts to retrieve
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let store = open_store(config)?;
        let result = store.search(&self.query, self.top_k).await?;

        if self.json {
            print_json(&result)
        } else {
            print_results(&result);
            Ok(())
        }
    }
}

fn print_results(result: &SearchResult) {
    if result.documents.is_empty() {
        println!("No posts found.");
        return;
    }

    let distances = result.distances.as_deref().unwrap_or_default();
    let metadatas = result.metadatas.as_deref().unwrap_or_default();

    for (i, document) in result.documents.iter().enumerate() {
        let distance = distances
            .get(i)
            .map(|d| format!("{:.3}", d))
            .unwrap_or_else(|| "-".to_string());
        println!("{}. [{}] {}", i + 1, distance, document);

        if let Some(metadata) = metadatas.get(i) {
            if let Some(timestamp) = &metadata.timestamp {
                println!("   {}", timestamp);
            }
            if let Some(url) = &metadata.url {
                println!("   {}", url);
            }
        }
    }
}

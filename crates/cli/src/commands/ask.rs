//! Ask command handler.
//!
//! Answers one question from the archive and lists the posts it drew on.

use super::{generation_client, open_store, print_json};
use clap::Args;
use tweetrag_core::{config::AppConfig, AppResult};
use tweetrag_knowledge::{RagResponse, DEFAULT_TOP_K};

/// Answer a single question from the archive
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Number of posts to retrieve as context
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask options: {:?}", self);

        let store = open_store(config)?;
        let llm = generation_client(config)?;

        let response = store
            .ask(llm.as_ref(), &config.generation_model, &self.query, self.top_k)
            .await?;

        if self.json {
            print_json(&response)
        } else {
            print_response(&response);
            Ok(())
        }
    }
}

/// Print the retrieved posts followed by the answer.
pub fn print_response(response: &RagResponse) {
    if !response.sources.is_empty() {
        println!("Retrieved posts:");
        for (i, source) in response.sources.iter().enumerate() {
            match &source.timestamp {
                Some(timestamp) => println!("{}. {} ({})", i + 1, source.snippet, timestamp),
                None => println!("{}. {}", i + 1, source.snippet),
            }
        }
        println!();
    }

    println!("Answer:");
    println!("{}", response.answer);
}

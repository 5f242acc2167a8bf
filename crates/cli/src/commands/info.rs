//! Info command handler.

use super::{open_store, print_json};
use clap::Args;
use tweetrag_core::{config::AppConfig, AppResult};

/// Show collection details
#[derive(Args, Debug)]
pub struct InfoCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl InfoCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing info command");

        let info = open_store(config)?.info()?;

        if self.json {
            return print_json(&info);
        }

        println!("Collection: {}", info.name);
        println!("  Posts: {}", info.document_count);
        println!("  Embedding model: {}", info.model_name);
        if let Some(bound) = &info.bound_model {
            if bound != &info.model_name {
                println!("  Stored vectors from: {}", bound);
            }
        }
        println!("  Generation model: {}", config.generation_model);
        println!("  Location: {}", info.persist_location.display());
        if let Some(created_at) = info.created_at {
            println!("  Created: {}", created_at.to_rfc3339());
        }

        Ok(())
    }
}

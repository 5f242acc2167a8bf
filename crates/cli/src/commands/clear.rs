//! Clear command handler.

use super::open_store;
use clap::Args;
use tweetrag_core::{config::AppConfig, AppResult};

/// Remove every post from the collection
#[derive(Args, Debug)]
pub struct ClearCommand {}

impl ClearCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing clear command for collection '{}'", config.collection);

        let removed = open_store(config)?.clear()?;
        println!("Removed {} posts from '{}'", removed, config.collection);

        Ok(())
    }
}

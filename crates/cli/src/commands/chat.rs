//! Interactive question loop.

use super::ask::print_response;
use super::{generation_client, open_store};
use clap::Args;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tweetrag_core::{config::AppConfig, AppResult};
use tweetrag_knowledge::DEFAULT_TOP_K;

const EXIT_WORDS: [&str; 3] = ["quit", "exit", "q"];

/// Ask questions interactively
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Number of posts to retrieve per question
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let store = open_store(config)?;
        let llm = generation_client(config)?;

        println!(
            "Ask about your tweets ({} posts loaded). Type 'quit' to exit.",
            store.index().count()?
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("\n> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let query = line.trim();

            if query.is_empty() {
                continue;
            }
            if is_exit(query) {
                break;
            }

            match store
                .ask(llm.as_ref(), &config.generation_model, query, self.top_k)
                .await
            {
                Ok(response) => print_response(&response),
                Err(e) => {
                    tracing::warn!(error = %e, "Question failed");
                    println!("Error: {}", e);
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }
}

fn is_exit(input: &str) -> bool {
    EXIT_WORDS.contains(&input.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words() {
        assert!(is_exit("quit"));
        assert!(is_exit("EXIT"));
        assert!(is_exit("q"));
        assert!(!is_exit("quitting time?"));
    }
}

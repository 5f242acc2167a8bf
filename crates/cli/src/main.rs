//! tweetrag CLI
//!
//! Main entry point for the tweetrag command-line tool.
//! Loads markdown tweet archives into a local vector index and answers
//! questions about them with a local generation model.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, ClearCommand, InfoCommand, LoadCommand, SearchCommand};
use std::path::PathBuf;
use tweetrag_core::{
    config::{AppConfig, ConfigOverrides},
    logging, AppResult,
};

/// tweetrag - ask questions about your tweet archive
#[derive(Parser, Debug)]
#[command(name = "tweetrag")]
#[command(about = "Retrieval-augmented Q&A over markdown tweet archives", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "TWEETRAG_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "TWEETRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the vector index
    #[arg(long, global = true)]
    persist_dir: Option<PathBuf>,

    /// Collection name
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Embedding provider (ollama, mock)
    #[arg(long, global = true)]
    embedding_provider: Option<String>,

    /// Embedding model identifier
    #[arg(long, global = true)]
    embedding_model: Option<String>,

    /// Generation model identifier
    #[arg(long, global = true)]
    generation_model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load an archive file or directory into the collection
    Load(LoadCommand),

    /// Show the posts nearest to a query
    Search(SearchCommand),

    /// Answer a single question from the archive
    Ask(AskCommand),

    /// Ask questions interactively
    Chat(ChatCommand),

    /// Show collection details
    Info(InfoCommand),

    /// Remove every post from the collection
    Clear(ClearCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Load(_) => "load",
            Commands::Search(_) => "search",
            Commands::Ask(_) => "ask",
            Commands::Chat(_) => "chat",
            Commands::Info(_) => "info",
            Commands::Clear(_) => "clear",
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(ConfigOverrides {
        persist_dir: cli.persist_dir,
        collection: cli.collection,
        embedding_provider: cli.embedding_provider,
        embedding_model: cli.embedding_model,
        generation_model: cli.generation_model,
        log_level: cli.log_level,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });
    config.validate()?;

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("tweetrag starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Persist location: {:?}", config.persist_location());
    tracing::debug!(
        "Models: embedding={} generation={}",
        config.embedding_model,
        config.generation_model
    );

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Load(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Info(cmd) => cmd.execute(&config),
        Commands::Clear(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

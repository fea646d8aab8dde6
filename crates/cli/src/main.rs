//! Guardiane CLI
//!
//! Main entry point for the guardiane command-line tool.
//! Answers parents' questions about teen safety and digital wellness from a
//! local knowledge base.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, IndexCommand};
use guardiane_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// Guardiane - teen safety and digital wellness assistant
#[derive(Parser, Debug)]
#[command(name = "guardiane")]
#[command(about = "Teen safety and digital wellness assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "GUARDIANE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "GUARDIANE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Generative model identifier
    #[arg(short, long, global = true, env = "GUARDIANE_MODEL")]
    model: Option<String>,

    /// Embedding provider (ollama, mock)
    #[arg(long, global = true, env = "GUARDIANE_EMBEDDING_PROVIDER")]
    embedding_provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question
    Ask(AskCommand),

    /// Build or refresh the vector index
    Index(IndexCommand),

    /// Answer questions read from stdin
    Chat(ChatCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load_with(cli.workspace, cli.config)
        .context("Failed to load configuration")?
        .with_overrides(
            cli.model,
            cli.embedding_provider,
            cli.log_level,
            cli.verbose,
            cli.no_color,
        );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)
        .context("Failed to initialize logging")?;

    tracing::info!("Guardiane CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Model: {}", config.llm.model);
    tracing::debug!("Embedding provider: {}", config.embedding.provider);

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Index(_) => "index",
        Commands::Chat(_) => "chat",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Index(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result.with_context(|| format!("guardiane {} failed", command_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_joins_words() {
        let cli = Cli::try_parse_from(["guardiane", "ask", "is", "TikTok", "safe?"]).unwrap();
        let Commands::Ask(cmd) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(cmd.question.join(" "), "is TikTok safe?");
    }

    #[test]
    fn test_parse_index_force() {
        let cli = Cli::try_parse_from(["guardiane", "index", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Index(IndexCommand { force: true, .. })));
    }
}

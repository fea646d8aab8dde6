//! Index command handler.
//!
//! Brings the persisted vector index up to date with the knowledge-base files.

use clap::Args;
use guardiane_core::{config::AppConfig, AppError, AppResult};
use guardiane_knowledge::{Assistant, BuildOutcome};

/// Build or refresh the vector index
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Rebuild even if the sources are unchanged
    #[arg(long)]
    pub force: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index command (force: {})", self.force);

        let assistant = Assistant::from_config(config)?;
        let outcome = assistant.reindex(self.force).await?;

        let (status, chunks) = match outcome {
            BuildOutcome::Loaded { chunks } => ("fresh", chunks),
            BuildOutcome::Rebuilt { chunks } => ("rebuilt", chunks),
        };

        if self.json {
            let output = serde_json::json!({
                "status": status,
                "chunks": chunks,
                "indexDir": config.index_dir(),
            });
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            match outcome {
                BuildOutcome::Loaded { .. } => {
                    println!("Index is up to date ({} chunks)", chunks)
                }
                BuildOutcome::Rebuilt { .. } => println!("Rebuilt index with {} chunks", chunks),
            }
            println!("  Location: {}", config.index_dir().display());
        }

        Ok(())
    }
}

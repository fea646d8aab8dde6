//! Ask command handler.
//!
//! Answers a single question and prints the result.

use clap::Args;
use guardiane_core::{config::AppConfig, AppError, AppResult};
use guardiane_knowledge::Assistant;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true, trailing_var_arg = true)]
    pub question: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self.question.join(" ");
        let assistant = Assistant::from_config(config)?;
        let answer = assistant.answer(&question).await;

        if self.json {
            let output = serde_json::json!({
                "question": question,
                "answer": answer,
            });
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", answer);
        }

        Ok(())
    }
}

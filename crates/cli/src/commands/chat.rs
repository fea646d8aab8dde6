//! Chat command handler.
//!
//! Answers questions read line by line from stdin until EOF or `exit`.

use clap::Args;
use guardiane_core::{config::AppConfig, AppResult};
use guardiane_knowledge::{Assistant, GREETING_RESPONSE};
use std::io::{IsTerminal, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Answer questions interactively
#[derive(Args, Debug)]
pub struct ChatCommand {}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let assistant = Assistant::from_config(config)?;
        let interactive = std::io::stdin().is_terminal();

        if interactive {
            println!("{}", GREETING_RESPONSE);
            println!("(type 'exit' to quit)");
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            if interactive {
                print!("> ");
                std::io::stdout().flush()?;
            }

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let line = line.trim();
            if matches!(line, "exit" | "quit") {
                break;
            }

            println!("{}", assistant.answer(line).await);
            if interactive {
                println!();
            }
        }

        tracing::debug!("Chat session ended");
        Ok(())
    }
}

//! LLM provider factory.
//!
//! Creates the generation client described by the application's
//! [`LlmSettings`].

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use guardiane_core::config::LlmSettings;
use guardiane_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the configured provider.
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown and `AppError::Llm`
/// if the HTTP client cannot be initialized.
pub fn create_client(settings: &LlmSettings) -> AppResult<Arc<dyn LlmClient>> {
    match settings.provider.to_lowercase().as_str() {
        "ollama" => {
            let client = OllamaClient::with_base_url(
                settings.endpoint.as_str(),
                Duration::from_secs(settings.timeout_secs),
            )?;
            tracing::debug!(
                "Created Ollama client at {} (timeout {}s)",
                settings.endpoint,
                settings.timeout_secs
            );
            Ok(Arc::new(client))
        }
        other => Err(AppError::Config(format!(
            "Unknown LLM provider: {}. Supported: ollama",
            other
        ))),
    }
}

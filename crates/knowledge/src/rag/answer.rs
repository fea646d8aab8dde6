//! Retrieval-augmented answering.
//!
//! Expands the question into a few paraphrases, retrieves chunks for each,
//! and asks the model to answer from the merged context only.

use super::expand::{merge_results, parse_variants};
use crate::embeddings::EmbeddingProvider;
use crate::types::ScoredChunk;
use crate::vector_index::VectorIndex;
use futures::future::try_join_all;
use guardiane_core::config::{LlmSettings, RagSettings};
use guardiane_core::AppResult;
use guardiane_llm::{LlmClient, LlmRequest};
use guardiane_prompt::defaults::{RAG_ANSWER_ID, RAG_EXPAND_ID, REFUSAL_PHRASE};
use guardiane_prompt::{build_prompt, load_prompt, BuiltPrompt, PromptDefinition};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Returned instead of an empty or apologetic model answer.
pub const FALLBACK_MESSAGE: &str = "I'm here to help with topics like online safety, teen mental health, and crisis resources. Ask me anything specific!";

/// Marker of a model answer that admits it does not know.
const APOLOGY_MARKER: &str = "i'm sorry";

pub struct RetrievalAugmentedAnswerer {
    llm: Arc<dyn LlmClient>,
    embedder: Arc<dyn EmbeddingProvider>,
    answer_prompt: PromptDefinition,
    expand_prompt: PromptDefinition,
    rag: RagSettings,
    llm_settings: LlmSettings,
}

impl RetrievalAugmentedAnswerer {
    /// Create an answerer, loading prompt overrides from `workspace`.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn EmbeddingProvider>,
        workspace: &Path,
        rag: RagSettings,
        llm_settings: LlmSettings,
    ) -> AppResult<Self> {
        Ok(Self {
            llm,
            embedder,
            answer_prompt: load_prompt(workspace, RAG_ANSWER_ID)?,
            expand_prompt: load_prompt(workspace, RAG_EXPAND_ID)?,
            rag,
            llm_settings,
        })
    }

    /// Answer `question` from the chunks of `index`.
    #[instrument(skip(self, index), fields(chunks = index.len()))]
    pub async fn answer(&self, index: &VectorIndex, question: &str) -> AppResult<String> {
        let queries = self.expand_query(question).await;

        let searches = queries
            .iter()
            .map(|query| index.retrieve(self.embedder.as_ref(), query, self.rag.top_k));
        let results = try_join_all(searches).await?;
        let chunks = merge_results(results, self.rag.max_context_chunks);

        if chunks.is_empty() {
            info!("No chunks retrieved, using fallback answer");
            return Ok(FALLBACK_MESSAGE.to_string());
        }

        info!(
            "Retrieved {} chunks from {} queries (best score: {:.3})",
            chunks.len(),
            queries.len(),
            chunks[0].score
        );

        let mut variables = HashMap::new();
        variables.insert("context".to_string(), build_context(&chunks));
        variables.insert("question".to_string(), question.trim().to_string());
        variables.insert("refusal".to_string(), REFUSAL_PHRASE.to_string());
        let prompt = build_prompt(&self.answer_prompt, variables)?;

        let response = self.llm.complete(&self.request(prompt)).await?;
        debug!("Model answered with {} characters", response.content.len());

        Ok(apply_fallback(&response.content))
    }

    /// Queries to search: the question itself plus model paraphrases.
    ///
    /// Expansion is best effort; on failure only the question is searched.
    async fn expand_query(&self, question: &str) -> Vec<String> {
        let question = question.trim();
        if self.rag.query_variants <= 1 {
            return vec![question.to_string()];
        }

        match self.paraphrase(question).await {
            Ok(output) => {
                let queries = parse_variants(question, &output, self.rag.query_variants);
                debug!("Expanded question into {} queries", queries.len());
                queries
            }
            Err(e) => {
                warn!("Query expansion failed, searching the question only: {}", e);
                vec![question.to_string()]
            }
        }
    }

    async fn paraphrase(&self, question: &str) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert(
            "count".to_string(),
            (self.rag.query_variants - 1).to_string(),
        );
        variables.insert("question".to_string(), question.to_string());
        let prompt = build_prompt(&self.expand_prompt, variables)?;

        let response = self.llm.complete(&self.request(prompt)).await?;
        Ok(response.content)
    }

    fn request(&self, prompt: BuiltPrompt) -> LlmRequest {
        let mut request = LlmRequest::new(prompt.user, &self.llm_settings.model);
        if let Some(system) = prompt.system {
            request = request.with_system(system);
        }
        if let Some(temperature) = self.llm_settings.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.llm_settings.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }
}

/// Join chunk texts into the context block handed to the model.
pub fn build_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|hit| hit.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Trim a model answer, replacing empty or apologetic ones with
/// [`FALLBACK_MESSAGE`].
pub fn apply_fallback(output: &str) -> String {
    let answer = output.trim();
    let normalized = answer.to_lowercase().replace('\u{2019}', "'");

    if answer.is_empty() || normalized.contains(APOLOGY_MARKER) {
        debug!("Model answer replaced by fallback");
        return FALLBACK_MESSAGE.to_string();
    }

    answer.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;

    #[test]
    fn test_fallback_on_empty_output() {
        assert_eq!(apply_fallback(""), FALLBACK_MESSAGE);
        assert_eq!(apply_fallback("  \n "), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_fallback_on_apology() {
        assert_eq!(apply_fallback("Well... I'M SORRY, no idea."), FALLBACK_MESSAGE);
        assert_eq!(apply_fallback(REFUSAL_PHRASE), FALLBACK_MESSAGE);
        assert_eq!(apply_fallback("I\u{2019}m sorry."), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_answer_is_trimmed() {
        assert_eq!(
            apply_fallback("  Call 988 any time.\n"),
            "Call 988 any time."
        );
    }

    #[test]
    fn test_build_context() {
        let hits: Vec<ScoredChunk> = ["first", "second"]
            .iter()
            .enumerate()
            .map(|(i, text)| ScoredChunk {
                chunk: Chunk {
                    id: i as u32,
                    unit: i as u32,
                    position: 0,
                    text: text.to_string(),
                },
                score: 1.0,
            })
            .collect();
        assert_eq!(build_context(&hits), "first\n\nsecond");
    }
}

//! The question-answering entry point.
//!
//! Routes each question to a statistical, greeting or retrieval answer. The
//! vector index is built on the first retrieval request and shared after
//! that. Concurrent requests wait on the same build, and a change to the
//! source files is picked up on the next retrieval request.

use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::fingerprint::compute_fingerprint;
use crate::rag::RetrievalAugmentedAnswerer;
use crate::records::KnowledgeSources;
use crate::router::{QueryRouter, Route, GREETING_RESPONSE};
use crate::types::BuildOutcome;
use crate::vector_index::{IndexSettings, VectorIndex};
use guardiane_core::{AppConfig, AppError, AppResult};
use guardiane_llm::{create_client, LlmClient};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

pub struct Assistant {
    sources: KnowledgeSources,
    index_settings: IndexSettings,
    embedder: Arc<dyn EmbeddingProvider>,
    rag: RetrievalAugmentedAnswerer,
    index: Mutex<Option<Arc<VectorIndex>>>,
}

impl Assistant {
    /// Build an assistant with the providers named in `config`.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;
        let embedder = create_provider(&config.embedding)?;
        let llm = create_client(&config.llm)?;
        Self::with_providers(config, embedder, llm)
    }

    /// Build an assistant around existing providers.
    pub fn with_providers(
        config: &AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmClient>,
    ) -> AppResult<Self> {
        let rag = RetrievalAugmentedAnswerer::new(
            llm,
            embedder.clone(),
            &config.workspace,
            config.rag,
            config.llm.clone(),
        )?;

        Ok(Self {
            sources: KnowledgeSources::from_config(config),
            index_settings: IndexSettings::from_config(config),
            embedder,
            rag,
            index: Mutex::new(None),
        })
    }

    /// Answer a question. Never fails: errors become user-facing messages.
    pub async fn answer(&self, question: &str) -> String {
        match self.try_answer(question).await {
            Ok(answer) => answer,
            Err(e) => {
                if e.is_provider_error() {
                    warn!("Provider unavailable: {}", e);
                } else if !matches!(e, AppError::Input(_)) {
                    error!("Failed to answer question: {}", e);
                }
                e.user_message().to_string()
            }
        }
    }

    /// Answer a question, keeping the error type.
    #[instrument(skip(self))]
    pub async fn try_answer(&self, question: &str) -> AppResult<String> {
        if question.trim().is_empty() {
            return Err(AppError::Input("Question is empty".to_string()));
        }

        let records = self.sources.read_all()?;
        match QueryRouter::route(question, &records) {
            Route::Statistical(answer) => Ok(answer),
            Route::Greeting => Ok(GREETING_RESPONSE.to_string()),
            Route::OpenDomain => {
                let index = self.index().await?;
                self.rag.answer(&index, question).await
            }
        }
    }

    /// The ready index, loading or building it on first use.
    ///
    /// The cached index is reused while its fingerprint matches the current
    /// source files; otherwise it is reloaded or rebuilt. A failed build
    /// leaves the previous value in place, so the next call tries again.
    pub async fn index(&self) -> AppResult<Arc<VectorIndex>> {
        // Held across the build so concurrent callers share one build
        let mut cached = self.index.lock().await;

        let current = compute_fingerprint(&self.sources)?;
        if let Some(index) = cached.as_ref() {
            if index.fingerprint() == current {
                return Ok(index.clone());
            }
            debug!("Source files changed since the index was loaded");
        }

        let (index, outcome) = VectorIndex::open_or_build(
            &self.index_settings,
            &self.sources,
            self.embedder.as_ref(),
            false,
        )
        .await?;
        info!("Vector index ready: {:?}", outcome);

        let index = Arc::new(index);
        *cached = Some(index.clone());
        Ok(index)
    }

    /// Bring the persisted index up to date without caching it.
    ///
    /// With `force` the index is rebuilt even when it is fresh.
    pub async fn reindex(&self, force: bool) -> AppResult<BuildOutcome> {
        let (_, outcome) = VectorIndex::open_or_build(
            &self.index_settings,
            &self.sources,
            self.embedder.as_ref(),
            force,
        )
        .await?;
        Ok(outcome)
    }
}

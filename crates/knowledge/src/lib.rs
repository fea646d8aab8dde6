//! Knowledge base and answer pipeline for Guardiane.
//!
//! Reads the FAQ and hotline files, keeps a persisted embedding index in
//! SQLite that is rebuilt only when the sources change, and answers questions
//! through a statistical, greeting or retrieval-augmented route.
//!
//! # Example
//! ```no_run
//! use guardiane_core::AppConfig;
//! use guardiane_knowledge::Assistant;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let assistant = Assistant::from_config(&config)?;
//! println!("{}", assistant.answer("How much screen time is healthy?").await);
//! # Ok(())
//! # }
//! ```

pub mod assistant;
pub mod chunker;
pub mod embeddings;
pub mod fingerprint;
pub mod index;
pub mod loader;
pub mod rag;
pub mod records;
pub mod router;
pub mod stats;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use assistant::Assistant;
pub use embeddings::{create_provider, EmbeddingProvider};
pub use fingerprint::compute_fingerprint;
pub use rag::{RetrievalAugmentedAnswerer, FALLBACK_MESSAGE};
pub use records::KnowledgeSources;
pub use router::{QueryRouter, Route, GREETING_RESPONSE};
pub use stats::answer_statistical;
pub use types::{
    BuildOutcome, Chunk, FaqRecord, HotlineRecord, IndexMeta, IndexStatus, KnowledgeRecord,
    ScoredChunk, TextUnit,
};
pub use vector_index::{IndexSettings, VectorIndex};

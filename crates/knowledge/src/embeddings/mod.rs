//! Embedding providers.
//!
//! The vector index only talks to [`EmbeddingProvider`]; concrete providers
//! are chosen from configuration by [`create_provider`].

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};

//! Prompt system for Guardiane.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions
//! - Built-in definitions for the answer pipeline, overridable per workspace
//! - Handlebars template rendering

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::load_prompt;
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};

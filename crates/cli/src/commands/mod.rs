//! Command handlers for the Guardiane CLI.

pub mod ask;
pub mod chat;
pub mod index;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use index::IndexCommand;

//! Retrieval-augmented generation over the vector index.

pub mod answer;
pub mod expand;

pub use answer::{apply_fallback, build_context, RetrievalAugmentedAnswerer, FALLBACK_MESSAGE};
pub use expand::{merge_results, parse_variants};

//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A FAQ entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FaqRecord {
    pub question: String,
    pub answer: String,
    /// Every top-level field of the source object, including the two above
    pub fields: Map<String, Value>,
}

/// A crisis hotline entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HotlineRecord {
    pub organization: String,
    pub topic: String,
    pub phone: String,
    pub website: String,
    /// Every top-level field of the source object
    pub fields: Map<String, Value>,
}

/// A structured knowledge-base entry, immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeRecord {
    Faq(FaqRecord),
    Hotline(HotlineRecord),
}

impl KnowledgeRecord {
    /// Raw top-level fields of the record as read from disk.
    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            KnowledgeRecord::Faq(faq) => &faq.fields,
            KnowledgeRecord::Hotline(hotline) => &hotline.fields,
        }
    }
}

/// Which kind of record a text unit was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitOrigin {
    Faq,
    Hotline,
}

/// A cleaned, deduplicated string derived from one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    pub text: String,
    pub origin: UnitOrigin,
}

/// A bounded-length slice of a text unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequential identifier, unique within one index build
    pub id: u32,

    /// Index of the text unit this chunk came from
    pub unit: u32,

    /// Position within the unit
    pub position: u32,

    /// Text content
    pub text: String,
}

/// A chunk stored in the vector index together with its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A retrieval hit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity to the query (-1.0 to 1.0)
    pub score: f32,
}

/// Facts about how a persisted index was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub embedding_model: String,
    pub dimensions: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub chunk_count: usize,
    pub built_at: DateTime<Utc>,
}

/// Freshness of the persisted index relative to the current sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    /// No index or no fingerprint on disk
    Missing,
    /// Fingerprint or build settings differ from the current ones
    Stale,
    /// Persisted index can be loaded as is
    Fresh,
}

/// What `VectorIndex::open_or_build` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Embeddings were read back from disk
    Loaded { chunks: usize },
    /// Every chunk was embedded again
    Rebuilt { chunks: usize },
}

//! In-memory vector index over embedded knowledge chunks.
//!
//! A `VectorIndex` is immutable once built or loaded. It is rebuilt only when
//! the source fingerprint changes, the build settings change, or no persisted
//! index exists.

use crate::chunker::split_units;
use crate::embeddings::EmbeddingProvider;
use crate::fingerprint::compute_fingerprint;
use crate::index;
use crate::loader::load_text_units;
use crate::records::KnowledgeSources;
use crate::types::{BuildOutcome, IndexMeta, IndexStatus, IndexedChunk, ScoredChunk};
use chrono::Utc;
use guardiane_core::config::ChunkingConfig;
use guardiane_core::{AppConfig, AppError, AppResult};
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Where and how an index is built.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSettings {
    /// Directory holding `index.sqlite` and `source.hash`
    pub dir: PathBuf,
    pub chunking: ChunkingConfig,
    /// Texts per embedding request
    pub batch_size: usize,
}

impl IndexSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            dir: config.index_dir(),
            chunking: config.chunking,
            batch_size: config.embedding.batch_size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
    meta: IndexMeta,
    fingerprint: String,
}

impl VectorIndex {
    /// Check the persisted index against the current sources and provider.
    pub fn status(
        settings: &IndexSettings,
        sources: &KnowledgeSources,
        provider: &dyn EmbeddingProvider,
    ) -> AppResult<IndexStatus> {
        let fingerprint = compute_fingerprint(sources)?;
        Self::status_for(settings, &fingerprint, provider)
    }

    fn status_for(
        settings: &IndexSettings,
        fingerprint: &str,
        provider: &dyn EmbeddingProvider,
    ) -> AppResult<IndexStatus> {
        let Some(stored) = index::read_fingerprint(&settings.dir)? else {
            return Ok(IndexStatus::Missing);
        };

        let meta = match index::read_meta(&settings.dir) {
            Ok(Some(meta)) => meta,
            Ok(None) => return Ok(IndexStatus::Missing),
            Err(e) => {
                warn!("Persisted index is unreadable, treating it as stale: {}", e);
                return Ok(IndexStatus::Stale);
            }
        };

        if stored != fingerprint {
            debug!("Source fingerprint changed");
            return Ok(IndexStatus::Stale);
        }

        if meta.embedding_model != provider.model_name()
            || meta.dimensions != provider.dimensions()
            || meta.chunk_size != settings.chunking.chunk_size
            || meta.chunk_overlap != settings.chunking.chunk_overlap
        {
            debug!(
                "Build settings changed (model {} -> {})",
                meta.embedding_model,
                provider.model_name()
            );
            return Ok(IndexStatus::Stale);
        }

        Ok(IndexStatus::Fresh)
    }

    /// Load the persisted index when it is fresh, otherwise build a new one.
    ///
    /// With `force` the fingerprint is ignored and the index is always rebuilt.
    #[instrument(skip_all, fields(dir = ?settings.dir, force = force))]
    pub async fn open_or_build(
        settings: &IndexSettings,
        sources: &KnowledgeSources,
        provider: &dyn EmbeddingProvider,
        force: bool,
    ) -> AppResult<(Self, BuildOutcome)> {
        let fingerprint = compute_fingerprint(sources)?;

        if !force {
            match Self::status_for(settings, &fingerprint, provider)? {
                IndexStatus::Fresh => match Self::load(settings, &fingerprint) {
                    Ok(loaded) => {
                        let chunks = loaded.len();
                        info!("Loaded vector index with {} chunks", chunks);
                        return Ok((loaded, BuildOutcome::Loaded { chunks }));
                    }
                    Err(e) => warn!("Failed to load persisted index, rebuilding: {}", e),
                },
                status => info!("Vector index is {:?}, rebuilding", status),
            }
        } else {
            info!("Forced rebuild of vector index");
        }

        let built = Self::build(settings, sources, provider, fingerprint).await?;
        let chunks = built.len();
        Ok((built, BuildOutcome::Rebuilt { chunks }))
    }

    fn load(settings: &IndexSettings, fingerprint: &str) -> AppResult<Self> {
        let (entries, meta) = index::load_index(&settings.dir)?;
        Ok(Self {
            entries,
            meta,
            fingerprint: fingerprint.to_string(),
        })
    }

    /// Embed every chunk of the sources and persist the result.
    async fn build(
        settings: &IndexSettings,
        sources: &KnowledgeSources,
        provider: &dyn EmbeddingProvider,
        fingerprint: String,
    ) -> AppResult<Self> {
        let faq = sources.read_faq()?;
        let hotlines = sources.read_hotlines()?;
        let units = load_text_units(&faq, &hotlines);
        let chunks = split_units(&units, &settings.chunking)?;

        let dimensions = provider.dimensions();
        let mut entries = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(settings.batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = provider.embed_batch(&texts).await?;

            if embeddings.len() != batch.len() {
                return Err(AppError::Embedding(format!(
                    "Provider returned {} embeddings for {} texts",
                    embeddings.len(),
                    batch.len()
                )));
            }

            for (chunk, embedding) in batch.iter().zip(embeddings) {
                if embedding.len() != dimensions {
                    return Err(AppError::Embedding(format!(
                        "Embedding for chunk {} has {} dimensions, expected {}",
                        chunk.id,
                        embedding.len(),
                        dimensions
                    )));
                }
                entries.push(IndexedChunk {
                    chunk: chunk.clone(),
                    embedding,
                });
            }
            debug!("Embedded {}/{} chunks", entries.len(), chunks.len());
        }

        let meta = IndexMeta {
            embedding_model: provider.model_name().to_string(),
            dimensions,
            chunk_size: settings.chunking.chunk_size,
            chunk_overlap: settings.chunking.chunk_overlap,
            chunk_count: entries.len(),
            built_at: Utc::now(),
        };

        index::write_index(&settings.dir, &entries, &meta)?;
        index::write_fingerprint(&settings.dir, &fingerprint)?;

        info!(
            "Built vector index: {} units, {} chunks, model {}",
            units.len(),
            entries.len(),
            meta.embedding_model
        );

        Ok(Self {
            entries,
            meta,
            fingerprint,
        })
    }

    /// Top-`k` chunks by cosine similarity, best first. Ties go to the lower id.
    pub fn search(&self, query_embedding: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut results: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query_embedding, &entry.embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        results.truncate(k);
        results
    }

    /// Embed `question` with `provider` and search for it.
    pub async fn retrieve(
        &self,
        provider: &dyn EmbeddingProvider,
        question: &str,
        k: usize,
    ) -> AppResult<Vec<ScoredChunk>> {
        let embedding = provider.embed(question).await?;
        let results = self.search(&embedding, k);
        debug!(
            "Retrieved {} chunks (requested top-{}), best score {:?}",
            results.len(),
            k,
            results.first().map(|r| r.score)
        );
        Ok(results)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    /// Fingerprint of the sources this index was built from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::MockProvider;
    use crate::tests::support::write_sources;
    use tempfile::TempDir;

    fn settings(dir: &TempDir) -> IndexSettings {
        IndexSettings {
            dir: dir.path().join("index"),
            chunking: ChunkingConfig::default(),
            batch_size: 4,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_status_moves_from_missing_to_fresh() {
        let dir = TempDir::new().unwrap();
        let sources = write_sources(dir.path());
        let settings = settings(&dir);
        let provider = MockProvider::new(64);

        assert_eq!(
            VectorIndex::status(&settings, &sources, &provider).unwrap(),
            IndexStatus::Missing
        );

        let (index, outcome) = VectorIndex::open_or_build(&settings, &sources, &provider, false)
            .await
            .unwrap();
        assert!(matches!(outcome, BuildOutcome::Rebuilt { .. }));
        assert!(!index.is_empty());
        assert_eq!(index.meta().embedding_model, "trigram-v1");

        assert_eq!(
            VectorIndex::status(&settings, &sources, &provider).unwrap(),
            IndexStatus::Fresh
        );
    }

    #[tokio::test]
    async fn test_model_change_makes_index_stale() {
        let dir = TempDir::new().unwrap();
        let sources = write_sources(dir.path());
        let settings = settings(&dir);

        VectorIndex::open_or_build(&settings, &sources, &MockProvider::new(64), false)
            .await
            .unwrap();

        assert_eq!(
            VectorIndex::status(&settings, &sources, &MockProvider::new(32)).unwrap(),
            IndexStatus::Stale
        );
    }

    #[tokio::test]
    async fn test_loaded_index_matches_built_index() {
        let dir = TempDir::new().unwrap();
        let sources = write_sources(dir.path());
        let settings = settings(&dir);
        let provider = MockProvider::new(64);

        let (built, _) = VectorIndex::open_or_build(&settings, &sources, &provider, false)
            .await
            .unwrap();
        let (loaded, outcome) = VectorIndex::open_or_build(&settings, &sources, &provider, false)
            .await
            .unwrap();

        assert_eq!(outcome, BuildOutcome::Loaded { chunks: built.len() });
        assert_eq!(loaded.entries, built.entries);
        assert_eq!(loaded.fingerprint(), built.fingerprint());
    }

    #[tokio::test]
    async fn test_force_rebuilds_fresh_index() {
        let dir = TempDir::new().unwrap();
        let sources = write_sources(dir.path());
        let settings = settings(&dir);
        let provider = MockProvider::new(64);

        VectorIndex::open_or_build(&settings, &sources, &provider, false)
            .await
            .unwrap();
        let (_, outcome) = VectorIndex::open_or_build(&settings, &sources, &provider, true)
            .await
            .unwrap();
        assert!(matches!(outcome, BuildOutcome::Rebuilt { .. }));
    }

    #[tokio::test]
    async fn test_retrieve_ranks_relevant_chunk_first() {
        let dir = TempDir::new().unwrap();
        let sources = write_sources(dir.path());
        let settings = settings(&dir);
        let provider = MockProvider::new(256);

        let (index, _) = VectorIndex::open_or_build(&settings, &sources, &provider, false)
            .await
            .unwrap();
        let results = index
            .retrieve(&provider, "cyberbullying warning signs", 3)
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].chunk.text.to_lowercase().contains("cyberbullying"));
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_search_breaks_ties_by_id() {
        let dir = TempDir::new().unwrap();
        let sources = write_sources(dir.path());
        let settings = settings(&dir);
        let provider = MockProvider::new(64);

        let (index, _) = VectorIndex::open_or_build(&settings, &sources, &provider, false)
            .await
            .unwrap();

        // A zero query scores every chunk 0.0
        let results = index.search(&vec![0.0; 64], index.len());
        let ids: Vec<u32> = results.iter().map(|r| r.chunk.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}

//! Text chunking with configurable size and overlap.
//!
//! Chunks are measured in characters (Unicode scalar values), never bytes, so
//! a multi-byte character is never split.

use crate::types::{Chunk, TextUnit};
use guardiane_core::config::ChunkingConfig;
use guardiane_core::{AppError, AppResult};

/// Split text into windows of `chunk_size` characters, consecutive windows
/// sharing exactly `chunk_overlap` characters.
///
/// Text of at most `chunk_size` characters yields a single chunk equal to the
/// text. Callers are expected to pass `chunk_overlap < chunk_size`.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }

    let chunk_size = chunk_size.max(1);
    let step = chunk_size.saturating_sub(chunk_overlap).max(1);

    // Byte offset of every character boundary, including the end of the text
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    if char_count <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(char_count);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());
        if end == char_count {
            break;
        }
        start += step;
    }

    chunks
}

/// Split every unit into chunks with sequential ids.
pub fn split_units(units: &[TextUnit], config: &ChunkingConfig) -> AppResult<Vec<Chunk>> {
    if config.chunk_size == 0 || config.chunk_overlap >= config.chunk_size {
        return Err(AppError::Config(format!(
            "Chunk overlap ({}) must be smaller than chunk size ({})",
            config.chunk_overlap, config.chunk_size
        )));
    }

    let mut chunks = Vec::new();
    for (unit_idx, unit) in units.iter().enumerate() {
        for (position, text) in split_text(&unit.text, config.chunk_size, config.chunk_overlap)
            .into_iter()
            .enumerate()
        {
            chunks.push(Chunk {
                id: chunks.len() as u32,
                unit: unit_idx as u32,
                position: position as u32,
                text,
            });
        }
    }

    tracing::debug!(
        "Chunked {} units into {} chunks (size: {}, overlap: {})",
        units.len(),
        chunks.len(),
        config.chunk_size,
        config.chunk_overlap
    );

    Ok(chunks)
}

//! Multi-query helpers: turning model paraphrases into search queries and
//! merging the hits of several searches.

use crate::types::ScoredChunk;
use std::collections::{HashMap, HashSet};

/// Build the query list from the original question and the model's
/// paraphrases, one per line.
///
/// The original question always comes first. List markers and wrapping
/// quotes are stripped, case-insensitive duplicates dropped, and the result
/// capped at `max_queries`.
pub fn parse_variants(question: &str, output: &str, max_queries: usize) -> Vec<String> {
    let question = question.trim();
    let mut seen = HashSet::from([question.to_lowercase()]);
    let mut queries = vec![question.to_string()];

    for line in output.lines() {
        if queries.len() >= max_queries {
            break;
        }
        let variant = strip_marker(line);
        if variant.is_empty() {
            continue;
        }
        if seen.insert(variant.to_lowercase()) {
            queries.push(variant.to_string());
        }
    }

    queries
}

/// Remove a leading bullet or number marker and wrapping quotes.
fn strip_marker(line: &str) -> &str {
    let mut text = line.trim();

    if let Some(rest) = text
        .strip_prefix("- ")
        .or_else(|| text.strip_prefix("* "))
        .or_else(|| text.strip_prefix("• "))
    {
        text = rest.trim_start();
    } else {
        let digits = text.len() - text.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits > 0 {
            let rest = &text[digits..];
            if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
                text = rest.trim_start();
            }
        }
    }

    text.trim_matches('"').trim()
}

/// Merge hits from several queries, keeping each chunk's best score.
///
/// Ordered by score, ties by chunk id, and capped at `limit`.
pub fn merge_results(results: Vec<Vec<ScoredChunk>>, limit: usize) -> Vec<ScoredChunk> {
    let mut best: HashMap<u32, ScoredChunk> = HashMap::new();

    for hit in results.into_iter().flatten() {
        match best.get(&hit.chunk.id) {
            Some(existing) if existing.score >= hit.score => {}
            _ => {
                best.insert(hit.chunk.id, hit);
            }
        }
    }

    let mut merged: Vec<ScoredChunk> = best.into_values().collect();
    merged.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.chunk.id.cmp(&b.chunk.id))
    });
    merged.truncate(limit);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;

    fn hit(id: u32, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id,
                unit: id,
                position: 0,
                text: format!("chunk {}", id),
            },
            score,
        }
    }

    #[test]
    fn test_parse_variants_keeps_original_first() {
        let output = "1. How do I know if my teen is being bullied online?\n\
                      2) What are signs of cyberbullying?\n\
                      - \"How can I tell if my child is harassed on social media?\"\n";
        let queries = parse_variants("Signs of cyberbullying?", output, 3);

        assert_eq!(
            queries,
            vec![
                "Signs of cyberbullying?".to_string(),
                "How do I know if my teen is being bullied online?".to_string(),
                "What are signs of cyberbullying?".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_variants_drops_duplicates_and_blanks() {
        let output = "\n  \nsigns of CYBERBULLYING?\n* Warning signs of online bullying\n";
        let queries = parse_variants("Signs of cyberbullying?", output, 5);
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1], "Warning signs of online bullying");
    }

    #[test]
    fn test_parse_variants_single_query() {
        assert_eq!(
            parse_variants("question", "another question", 1),
            vec!["question".to_string()]
        );
    }

    #[test]
    fn test_year_is_not_a_list_marker() {
        assert_eq!(strip_marker("2024 screen time guidance"), "2024 screen time guidance");
        assert_eq!(strip_marker("12. Twelfth"), "Twelfth");
    }

    #[test]
    fn test_merge_keeps_best_score() {
        let merged = merge_results(
            vec![
                vec![hit(1, 0.9), hit(2, 0.5)],
                vec![hit(2, 0.8), hit(3, 0.5)],
            ],
            10,
        );

        let ids: Vec<u32> = merged.iter().map(|h| h.chunk.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!((merged[1].score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_merge_caps_results() {
        let merged = merge_results(vec![vec![hit(4, 0.1), hit(5, 0.2), hit(6, 0.3)]], 2);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].chunk.id, 6);
    }
}

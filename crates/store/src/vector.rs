//! Vector similarity utilities.

use askpdf_core::{Chunk, ScoredChunk};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold((0.0f64, 0.0f64, 0.0f64), |acc, (x, y)| {
        let (x, y) = (*x as f64, *y as f64);
        (acc.0 + x * y, acc.1 + x * x, acc.2 + y * y)
    });

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank chunks by cosine similarity to a query embedding.
///
/// Chunks without an embedding are skipped. Ties keep insertion order.
pub fn rank_chunks<'a, I>(chunks: I, query: &[f32], limit: usize) -> Vec<ScoredChunk>
where
    I: IntoIterator<Item = &'a Chunk>,
{
    let mut scored: Vec<ScoredChunk> = chunks
        .into_iter()
        .filter_map(|chunk| {
            let emb = chunk.embedding.as_ref()?;
            Some(ScoredChunk {
                score: cosine_similarity(emb, query),
                chunk: chunk.clone(),
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}

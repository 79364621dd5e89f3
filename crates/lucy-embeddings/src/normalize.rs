//! Vector normalization, similarity, and distance functions.
//!
//! Two measures are used on purpose: [`squared_euclidean`] is the cheap
//! shortlist distance for the vector index, [`cosine_similarity`] is the exact
//! score for re-ranking. They are not interchangeable.

/// Compute the L2 (Euclidean) norm of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// L2-normalize a vector in-place. Zero vectors remain zero.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Cosine similarity, clamped to `[-1, 1]`.
///
/// Computed as `dot / sqrt(|a|² · |b|²)` so a vector compared with itself
/// scores exactly `1.0`. Zero vectors score `0.0`.
///
/// Both slices must have the same length; callers validate dimensions first.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have equal dimensions");
    let mut dot = 0.0_f32;
    let mut norm_a_sq = 0.0_f32;
    let mut norm_b_sq = 0.0_f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a_sq += x * x;
        norm_b_sq += y * y;
    }
    if norm_a_sq == 0.0 || norm_b_sq == 0.0 {
        return 0.0;
    }
    (dot / (norm_a_sq * norm_b_sq).sqrt()).clamp(-1.0, 1.0)
}

/// Squared Euclidean distance between two vectors of the same length.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have equal dimensions");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
}

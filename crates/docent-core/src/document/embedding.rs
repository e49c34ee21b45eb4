//! Embedding capability seam.
//!
//! The segmenter only needs an order-preserving, deterministic mapping
//! from text spans to fixed-size vectors. Real embedding backends live
//! outside this crate; `HashingEmbedder` is the built-in offline
//! implementation used by the CLI and tests.

use crate::error::Result;

/// Maps an ordered list of text spans to fixed-length numeric vectors.
///
/// Implementations must be order-preserving and deterministic for
/// identical input.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Cosine similarity between two vectors.
///
/// Defined as 0.0 when either norm is zero, so degenerate embeddings
/// never poison segmentation.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    let norm_product = norm_a * norm_b;
    if norm_product == 0.0 {
        return 0.0;
    }

    dot / norm_product
}

/// Component-wise mean of a non-empty set of vectors.
pub fn centroid(vectors: &[&[f32]]) -> Vec<f32> {
    if vectors.is_empty() {
        return Vec::new();
    }

    let dim = vectors[0].len();
    let mut mean = vec![0.0f32; dim];
    for vector in vectors {
        for (slot, value) in mean.iter_mut().zip(vector.iter()) {
            *slot += value;
        }
    }
    let count = vectors.len() as f32;
    for slot in &mut mean {
        *slot /= count;
    }
    mean
}

/// Deterministic bag-of-words embedder.
///
/// Tokens are lowercased, split on non-alphanumeric boundaries, and
/// hashed (FNV-1a) into a fixed-width frequency vector. Crude as a
/// semantic model, but stable across runs and platforms, which is all
/// the offline pipeline and the test suite need.
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let slot = fnv1a(&token.to_lowercase()) as usize % self.dimension;
            vector[slot] += 1.0;
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// FNV-1a, 64-bit. Stable across platforms, unlike `DefaultHasher`.
fn fnv1a(input: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for byte in input.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_vectors() {
        let v = vec![0.3, 0.4, 0.5];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_norm_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_centroid_is_component_mean() {
        let a = [1.0f32, 3.0];
        let b = [3.0f32, 5.0];
        let mean = centroid(&[&a, &b]);
        assert_eq!(mean, vec![2.0, 4.0]);
    }

    #[test]
    fn test_hashing_embedder_is_deterministic_and_order_preserving() {
        let embedder = HashingEmbedder::default();
        let texts = vec!["alpha beta".to_string(), "gamma delta".to_string()];

        let first = embedder.embed(&texts).unwrap();
        let second = embedder.embed(&texts).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(first[0] != first[1]);
    }

    #[test]
    fn test_hashing_embedder_similar_texts_score_high() {
        let embedder = HashingEmbedder::default();
        let texts = vec![
            "the quick brown fox jumps".to_string(),
            "the quick brown fox leaps".to_string(),
            "completely unrelated subject matter entirely".to_string(),
        ];

        let vectors = embedder.embed(&texts).unwrap();
        let close = cosine_similarity(&vectors[0], &vectors[1]);
        let far = cosine_similarity(&vectors[0], &vectors[2]);

        assert!(close > far);
    }
}

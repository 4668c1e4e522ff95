/// Mock embedder for testing without calling the Gemini API.
use std::hash::{DefaultHasher, Hash, Hasher};

use super::Embedder;
use crate::gemini::ProviderError;

/// Produces deterministic, L2-normalized vectors from text hashes.
///
/// Identical text always maps to an identical vector, so an exact-text query
/// ranks its own stored chunk first.
pub struct MockEmbedder {
    pub dimensions: usize,
}

impl MockEmbedder {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self { dimensions: 768 }
    }
}

fn hash_embedding(text: &str, dimensions: usize) -> Vec<f32> {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let bytes = hasher.finish().to_le_bytes();

    let mut embedding = Vec::with_capacity(dimensions);
    for i in 0..dimensions {
        embedding.push(bytes[i % 8] as f32 / 255.0);
    }

    // L2 normalize
    let norm_sq: f32 = embedding.iter().map(|v| v * v).sum();
    if norm_sq > 0.0 {
        let inv = 1.0 / norm_sq.sqrt();
        for v in &mut embedding {
            *v *= inv;
        }
    }

    embedding
}

impl Embedder for MockEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts
            .iter()
            .map(|t| hash_embedding(t, self.dimensions))
            .collect())
    }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        Ok(hash_embedding(text, self.dimensions))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Embedder trait and shared types for text embedding.
pub mod gemini;
pub mod mock;

use crate::gemini::ProviderError;

/// Trait for text embedding implementations.
///
/// All implementations must be `Send + Sync` to allow sharing behind `Arc`.
pub trait Embedder: Send + Sync {
    /// Embed multiple document texts into vectors.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError>;

    /// Embed a single query string. May use a different task hint than
    /// document embedding, but the model (and dimensionality) is the same.
    fn embed_query(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Return the dimensionality of the embedding vectors.
    fn dimensions(&self) -> usize;
}

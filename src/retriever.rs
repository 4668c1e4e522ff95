//! Retrieval over the vector store.
//!
//! Embeds a question, searches the store, and hands back chunk texts only —
//! vectors and record metadata stay below this seam.
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::debug;

use crate::embedder::Embedder;
use crate::gemini::ProviderError;
use crate::store::{StoreError, VectorStore};

/// Errors from a retrieval attempt. An empty result is not an error.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Wraps the vector store with query embedding and top-k search.
pub struct Retriever {
    store: Arc<Mutex<VectorStore>>,
    embedder: Arc<dyn Embedder>,
    default_k: usize,
}

impl Retriever {
    pub fn new(
        store: Arc<Mutex<VectorStore>>,
        embedder: Arc<dyn Embedder>,
        default_k: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            default_k,
        }
    }

    /// Return the texts of the top-k chunks most similar to `question`,
    /// in descending similarity order. `k` falls back to the configured
    /// default when not given. An empty store yields an empty vec.
    pub fn retrieve(&self, question: &str, k: Option<usize>) -> Result<Vec<String>, RetrievalError> {
        let k = k.unwrap_or(self.default_k);
        let query_vector = self.embedder.embed_query(question)?;

        let store = self.store.lock().expect("store lock poisoned");
        let results = store.search(&query_vector, k)?;
        debug!(count = results.len(), k, "retrieved chunks");

        Ok(results.into_iter().map(|r| r.content).collect())
    }

    /// The k used when a call does not override it.
    #[must_use]
    pub fn default_k(&self) -> usize {
        self.default_k
    }
}

/// Join retrieved chunk texts into a single context block, preserving
/// retrieval order.
#[must_use]
pub fn format_context(chunks: &[String]) -> String {
    chunks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::Chunk;
    use crate::embedder::mock::MockEmbedder;

    fn empty_store() -> Arc<Mutex<VectorStore>> {
        Arc::new(Mutex::new(
            VectorStore::open_in_memory("test_store", 768).unwrap(),
        ))
    }

    #[test]
    fn test_retrieve_from_empty_store() {
        let retriever = Retriever::new(empty_store(), Arc::new(MockEmbedder::default()), 5);
        let chunks = retriever.retrieve("anything at all?", None).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_retrieve_exact_text_ranks_first() {
        let store = empty_store();
        let embedder = Arc::new(MockEmbedder::default());

        let texts = ["The cat sat on the mat.", "Rust is a systems language."];
        let embeddings = embedder.embed_batch(&texts).unwrap();
        let chunks: Vec<Chunk> = texts
            .iter()
            .map(|t| Chunk {
                content: t.to_string(),
                position: 0,
            })
            .collect();
        store
            .lock()
            .unwrap()
            .insert(&chunks, "pets.txt", &embeddings)
            .unwrap();

        let retriever = Retriever::new(store, embedder, 5);
        let results = retriever
            .retrieve("The cat sat on the mat.", Some(1))
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0], "The cat sat on the mat.");
    }

    #[test]
    fn test_k_override_limits_results() {
        let store = empty_store();
        let embedder = Arc::new(MockEmbedder::default());

        let texts = ["one", "two", "three"];
        let embeddings = embedder.embed_batch(&texts).unwrap();
        let chunks: Vec<Chunk> = texts
            .iter()
            .map(|t| Chunk {
                content: t.to_string(),
                position: 0,
            })
            .collect();
        store
            .lock()
            .unwrap()
            .insert(&chunks, "nums.txt", &embeddings)
            .unwrap();

        let retriever = Retriever::new(store, embedder, 5);
        assert_eq!(retriever.retrieve("numbers", None).unwrap().len(), 3);
        assert_eq!(retriever.retrieve("numbers", Some(2)).unwrap().len(), 2);
    }

    #[test]
    fn test_format_context() {
        let chunks = vec!["first chunk".to_string(), "second chunk".to_string()];
        assert_eq!(format_context(&chunks), "first chunk\n\nsecond chunk");
        assert_eq!(format_context(&[]), "");
    }
}

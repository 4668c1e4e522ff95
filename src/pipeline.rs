//! The RAG pipeline: retrieval, prompt assembly, and answer generation
//! composed into a single `query` operation, plus chunk-and-store `ingest`.
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{info, warn};

use crate::chunker;
use crate::config::Config;
use crate::embedder::Embedder;
use crate::gemini::ProviderError;
use crate::generator::{AnswerGenerator, GenerationParams};
use crate::retriever::{Retriever, RetrievalError, format_context};
use crate::store::{StoreError, VectorStore};

const PROMPT_TEMPLATE: &str = "You are a helpful assistant that answers questions based on the provided context from documents.

Context from documents:
{context}

Question: {question}

Instructions:
- Answer the question based primarily on the provided context
- If the context doesn't contain enough information, say so politely
- Be accurate and cite specific details from the context when possible
- Keep your responses informative but concise

Answer:";

/// Pipeline construction failures. Fatal: a pipeline is never left in a
/// partially usable state.
#[derive(Error, Debug)]
pub enum InitError {
    #[error(
        "embedder produces {embedder}-dimensional vectors but the store was created with {store}"
    )]
    DimensionMismatch { embedder: usize, store: usize },
}

/// Ingestion failures propagate to the caller; ingestion is an explicit
/// administrative action, not a conversational turn.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
enum QueryError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Result of a query. A conversational surface always gets text back:
/// failures are reported as the answer rather than raised.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Generated answer, returned verbatim from the model.
    Answered(String),
    /// User-facing description of a retrieval or generation failure.
    Failed(String),
}

impl QueryOutcome {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            QueryOutcome::Answered(text) | QueryOutcome::Failed(text) => text,
        }
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        matches!(self, QueryOutcome::Answered(_))
    }
}

/// Composes retriever, prompt template, and answer generator.
///
/// One long-lived instance per process; it owns its retriever and generator
/// and references a shared vector store that can be swapped at runtime.
/// Not internally synchronized — a concurrent caller must add its own
/// locking around `query` and `ingest`.
pub struct RagPipeline {
    store: Arc<Mutex<VectorStore>>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn AnswerGenerator>,
    retriever: Retriever,
    chunk_size: usize,
    chunk_overlap: usize,
    /// Current sampling defaults; updated by any query that overrides them.
    defaults: GenerationParams,
}

impl RagPipeline {
    /// Build a pipeline over an already opened store. Fails when the
    /// embedder and the store disagree on vector dimensionality.
    pub fn new(
        store: Arc<Mutex<VectorStore>>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn AnswerGenerator>,
        config: &Config,
    ) -> Result<Self, InitError> {
        check_dimensions(&store, embedder.as_ref())?;

        let retriever = Retriever::new(store.clone(), embedder.clone(), config.retrieval_k);

        Ok(Self {
            store,
            embedder,
            generator,
            retriever,
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            defaults: config.generation_defaults(),
        })
    }

    /// Answer a question from the stored documents.
    ///
    /// Passing `Some(params)` uses those sampling settings and makes them
    /// the new defaults for subsequent calls, matching a live settings
    /// surface that reconfigures generation before each turn.
    ///
    /// Never returns an error: any failure along the way becomes a
    /// [`QueryOutcome::Failed`] carrying a user-facing message.
    pub fn query(&mut self, question: &str, params: Option<GenerationParams>) -> QueryOutcome {
        if let Some(params) = params {
            self.defaults = params;
        }
        let params = self.defaults;

        match self.answer(question, params) {
            Ok(answer) => QueryOutcome::Answered(answer),
            Err(e) => {
                warn!("query failed: {e}");
                QueryOutcome::Failed(format!("Error generating response: {e}"))
            }
        }
    }

    fn answer(&self, question: &str, params: GenerationParams) -> Result<String, QueryError> {
        let chunks = self.retriever.retrieve(question, None)?;
        let prompt = build_prompt(&format_context(&chunks), question);
        let answer = self.generator.generate(&prompt, params)?;
        Ok(answer)
    }

    /// Chunk `text` and append the chunks to the store. Returns the number
    /// of chunks ingested. Errors propagate to the caller.
    pub fn ingest(&self, text: &str, source: &str) -> Result<usize, IngestError> {
        let chunks = chunker::split_into_chunks(text, self.chunk_size, self.chunk_overlap);
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;

        let mut store = self.store.lock().expect("store lock poisoned");
        store.insert(&chunks, source, &embeddings)?;
        info!(chunks = chunks.len(), source, "ingested document");

        Ok(chunks.len())
    }

    /// Swap the backing store and rebuild the retriever. Subsequent queries
    /// use the new store; no data is migrated from the old one.
    pub fn update_store(&mut self, new_store: Arc<Mutex<VectorStore>>) -> Result<(), InitError> {
        check_dimensions(&new_store, self.embedder.as_ref())?;

        self.retriever = Retriever::new(
            new_store.clone(),
            self.embedder.clone(),
            self.retriever_k(),
        );
        self.store = new_store;
        info!("vector store swapped");
        Ok(())
    }

    /// Contents summary of the active store.
    pub fn store_stats(&self) -> Result<crate::store::StoreStats, StoreError> {
        self.store.lock().expect("store lock poisoned").stats()
    }

    /// Current sampling defaults (as last set by construction or a query).
    #[must_use]
    pub fn generation_defaults(&self) -> GenerationParams {
        self.defaults
    }

    fn retriever_k(&self) -> usize {
        self.retriever.default_k()
    }
}

fn check_dimensions(
    store: &Arc<Mutex<VectorStore>>,
    embedder: &dyn Embedder,
) -> Result<(), InitError> {
    let store_dims = store.lock().expect("store lock poisoned").dimensions();
    if store_dims != embedder.dimensions() {
        return Err(InitError::DimensionMismatch {
            embedder: embedder.dimensions(),
            store: store_dims,
        });
    }
    Ok(())
}

fn build_prompt(context: &str, question: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{context}", context)
        .replace("{question}", question)
}

//! # DocBuddy — Retrieval-augmented question answering over your documents
//!
//! Ingested documents are chunked, embedded, and stored in a local
//! persistent vector index; at query time the most relevant chunks are
//! retrieved and passed with the question to a language model for a
//! grounded answer.
//!
//! ## Architecture
//!
//! - **[`config`]** — Environment-driven configuration with validation
//! - **[`chunker`]** — Overlapping text chunking with boundary preference
//! - **[`gemini`]** — Blocking Gemini REST client (embeddings + generation)
//! - **[`embedder`]** — Embedding trait, Gemini impl, deterministic mock
//! - **[`store`]** — SQLite + sqlite-vec persistent vector store
//! - **[`retriever`]** — Query embedding + top-k similarity search
//! - **[`generator`]** — Answer generation trait, Gemini impl, mocks
//! - **[`pipeline`]** — Retrieve → prompt → generate composition

pub mod chunker;
pub mod config;
pub mod embedder;
pub mod gemini;
pub mod generator;
pub mod pipeline;
pub mod retriever;
pub mod store;

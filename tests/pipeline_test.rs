/// End-to-end tests for the DocBuddy pipeline.
///
/// Tests the complete flow with mock providers:
///   Config → Store → Ingest → Retrieve → Generate
use std::sync::{Arc, Mutex};

use docbuddy::config::Config;
use docbuddy::embedder::Embedder;
use docbuddy::embedder::mock::MockEmbedder;
use docbuddy::generator::GenerationParams;
use docbuddy::generator::mock::{FailingGenerator, MockGenerator};
use docbuddy::pipeline::RagPipeline;
use docbuddy::store::VectorStore;
use tempfile::tempdir;

fn test_config() -> Config {
    Config {
        api_key: "test-key".to_string(),
        ..Config::default()
    }
}

fn shared(store: VectorStore) -> Arc<Mutex<VectorStore>> {
    Arc::new(Mutex::new(store))
}

/// Full pipeline: ingest a multi-chunk document, then answer a question
/// grounded in the retrieved chunks.
#[test]
fn test_ingest_then_query() {
    let config = test_config();
    let store = shared(VectorStore::open_in_memory("docbuddy_store", 768).unwrap());
    let embedder = Arc::new(MockEmbedder::default());
    let generator = Arc::new(MockGenerator::new("The cat sat on the mat."));

    let mut pipeline =
        RagPipeline::new(store.clone(), embedder, generator.clone(), &config).unwrap();

    // A 2500-char document splits into 3-4 overlapping chunks.
    let sentence = "The cat sat on the mat while the dog watched quietly. ";
    let document: String = sentence.repeat(47).chars().take(2500).collect();

    let count = pipeline.ingest(&document, "pets.txt").unwrap();
    assert!((3..=4).contains(&count), "expected 3-4 chunks, got {count}");
    assert_eq!(pipeline.store_stats().unwrap().records, count);

    let outcome = pipeline.query("Where did the cat sit?", None);
    assert!(outcome.is_answered());
    assert_eq!(outcome.text(), "The cat sat on the mat.");

    // The generator saw real document content inside the prompt.
    let (prompt, params) = generator.last_call().unwrap();
    assert!(prompt.contains("The cat sat on the mat"));
    assert!(prompt.contains("Where did the cat sit?"));
    assert_eq!(params, config.generation_defaults());
}

/// Ingestion round-trip: querying with text drawn verbatim from an
/// inserted chunk returns that chunk at the top.
#[test]
fn test_verbatim_chunk_retrieval() {
    let store = shared(VectorStore::open_in_memory("docbuddy_store", 768).unwrap());
    let embedder = Arc::new(MockEmbedder::default());

    let pipeline = RagPipeline::new(
        store.clone(),
        embedder.clone(),
        Arc::new(MockGenerator::new("ok")),
        &test_config(),
    )
    .unwrap();

    pipeline.ingest("The cat sat on the mat.", "pets.txt").unwrap();
    pipeline.ingest("Completely unrelated text.", "other.txt").unwrap();

    let query_vec = embedder.embed_query("The cat sat on the mat.").unwrap();
    let results = store.lock().unwrap().search(&query_vec, 1).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content, "The cat sat on the mat.");
    assert_eq!(results[0].source, "pets.txt");
}

/// Provider failure during a query degrades to a textual answer instead
/// of an error; ingestion keeps working.
#[test]
fn test_query_degradation() {
    let store = shared(VectorStore::open_in_memory("docbuddy_store", 768).unwrap());
    let mut pipeline = RagPipeline::new(
        store,
        Arc::new(MockEmbedder::default()),
        Arc::new(FailingGenerator),
        &test_config(),
    )
    .unwrap();

    let outcome = pipeline.query("anything?", None);
    assert!(!outcome.is_answered());
    assert!(outcome.text().contains("Error generating response"));

    // Ingestion does not involve the generator and still succeeds.
    assert!(pipeline.ingest("Some document text.", "doc.txt").is_ok());
}

/// Records written through the pipeline survive a process-style restart
/// (drop the store handle, reopen the same path and collection).
#[test]
fn test_persistence_across_reopen() {
    let dir = tempdir().unwrap();
    let config = test_config();
    let embedder = Arc::new(MockEmbedder::default());

    {
        let store = shared(
            VectorStore::open_or_create(dir.path(), &config.collection_name, 768).unwrap(),
        );
        let pipeline = RagPipeline::new(
            store,
            embedder.clone(),
            Arc::new(MockGenerator::new("ok")),
            &config,
        )
        .unwrap();
        pipeline
            .ingest("Persistent knowledge lives here.", "notes.txt")
            .unwrap();
    }

    let reopened = shared(
        VectorStore::open_or_create(dir.path(), &config.collection_name, 768).unwrap(),
    );
    let generator = Arc::new(MockGenerator::new("still here"));
    let mut pipeline =
        RagPipeline::new(reopened, embedder, generator.clone(), &config).unwrap();

    assert_eq!(pipeline.store_stats().unwrap().records, 1);

    pipeline.query("what lives here?", None);
    let (prompt, _) = generator.last_call().unwrap();
    assert!(prompt.contains("Persistent knowledge lives here."));
}

/// Swapping the store points subsequent queries at the new collection.
#[test]
fn test_update_store() {
    let config = test_config();
    let embedder = Arc::new(MockEmbedder::default());
    let generator = Arc::new(MockGenerator::new("ok"));

    let first = shared(VectorStore::open_in_memory("docbuddy_store", 768).unwrap());
    let mut pipeline =
        RagPipeline::new(first, embedder.clone(), generator.clone(), &config).unwrap();
    pipeline.ingest("Text in the first store.", "a.txt").unwrap();

    let second = shared(VectorStore::open_in_memory("docbuddy_store", 768).unwrap());
    pipeline.update_store(second).unwrap();
    pipeline.ingest("Text in the second store.", "b.txt").unwrap();

    pipeline.query("which store?", None);
    let (prompt, _) = generator.last_call().unwrap();
    assert!(prompt.contains("Text in the second store."));
    assert!(!prompt.contains("Text in the first store."));
}

/// Overriding sampling settings on a query makes them the defaults for
/// later calls.
#[test]
fn test_generation_settings_persist_across_calls() {
    let generator = Arc::new(MockGenerator::new("ok"));
    let store = shared(VectorStore::open_in_memory("docbuddy_store", 768).unwrap());
    let mut pipeline = RagPipeline::new(
        store,
        Arc::new(MockEmbedder::default()),
        generator.clone(),
        &test_config(),
    )
    .unwrap();

    let custom = GenerationParams {
        temperature: 0.2,
        max_tokens: 300,
    };
    pipeline.query("first?", Some(custom));
    pipeline.query("second?", None);

    assert_eq!(generator.call_count(), 2);
    assert_eq!(generator.last_call().unwrap().1, custom);
}

/// An empty credential is rejected before any store or model is touched.
#[test]
fn test_empty_credential_rejected() {
    let config = Config::default();
    assert!(config.validate().is_err());
}

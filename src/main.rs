use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use docbuddy::config::Config;
use docbuddy::embedder::gemini::GeminiEmbedder;
use docbuddy::gemini::GeminiClient;
use docbuddy::generator::gemini::GeminiGenerator;
use docbuddy::pipeline::RagPipeline;
use docbuddy::store::VectorStore;

/// Ask questions about your documents, grounded in a local vector store.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chunk, embed, and store a UTF-8 text document
    Ingest {
        /// Path to the text file to ingest
        file: PathBuf,
        /// Source name recorded with each chunk (defaults to the file name)
        #[arg(long)]
        source: Option<String>,
    },
    /// Ask a single question and print the answer
    Query {
        /// The question to answer
        question: String,
        /// Sampling temperature for this question
        #[arg(long)]
        temperature: Option<f32>,
        /// Maximum tokens to generate
        #[arg(long)]
        max_tokens: Option<u32>,
    },
    /// Interactive question-and-answer loop
    Chat,
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let store = VectorStore::open_or_create(
        &config.vector_store_path,
        &config.collection_name,
        config.embedding_dimensions,
    )
    .context("Failed to open vector store")?;
    let store = Arc::new(Mutex::new(store));

    let client = GeminiClient::new(config.api_key.clone()).context("Failed to build API client")?;
    let embedder = Arc::new(GeminiEmbedder::new(
        client.clone(),
        config.embedding_model.clone(),
        config.embedding_dimensions,
    ));
    let generator = Arc::new(GeminiGenerator::new(client, config.llm_model.clone()));

    let mut pipeline = RagPipeline::new(store, embedder, generator, &config)
        .context("Failed to initialize pipeline")?;

    match args.command {
        Command::Ingest { file, source } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let source = source.unwrap_or_else(|| {
                file.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.display().to_string())
            });

            let count = pipeline
                .ingest(&text, &source)
                .with_context(|| format!("Failed to ingest {source}"))?;
            println!("Ingested {count} chunks from {source}");
        }
        Command::Query {
            question,
            temperature,
            max_tokens,
        } => {
            let defaults = pipeline.generation_defaults();
            let params = docbuddy::generator::GenerationParams {
                temperature: temperature.unwrap_or(defaults.temperature),
                max_tokens: max_tokens.unwrap_or(defaults.max_tokens),
            };
            let outcome = pipeline.query(&question, Some(params));
            println!("{}", outcome.text());
        }
        Command::Chat => run_chat_loop(&mut pipeline)?,
    }

    Ok(())
}

fn run_chat_loop(pipeline: &mut RagPipeline) -> Result<()> {
    let stats = pipeline.store_stats().context("Failed to read store stats")?;
    match stats.last_ingest {
        Some(t) => info!("Store has {} chunks (last ingest {})", stats.records, t),
        None => info!("Store is empty — ingest a document first"),
    }

    info!("Ready to answer questions about your documents. Type 'exit' to quit.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut buffer = String::new();

    loop {
        print!("\nYour question: ");
        stdout.flush()?;

        buffer.clear();
        if stdin.read_line(&mut buffer)? == 0 {
            break;
        }

        let question = buffer.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") {
            info!("Goodbye!");
            break;
        }

        let outcome = pipeline.query(question, None);
        println!("\n{}", outcome.text());
    }

    Ok(())
}

//! Persistent vector store using SQLite and sqlite-vec.
//!
//! A store is a directory holding one SQLite database per collection. Records
//! are append-only: (chunk text, start offset, source, embedding, timestamp).
use std::path::Path;
use std::sync::Once;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use sqlite_vec::sqlite3_vec_init;
use thiserror::Error;
use tracing::info;

use crate::chunker::Chunk;

pub mod search;

/// Errors from opening or operating on the vector store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("embedding dimension mismatch: store expects {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

static INIT_VEC: Once = Once::new();

/// Initialize the sqlite-vec extension. Safe to call multiple times.
fn init_sqlite_vec() {
    INIT_VEC.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite3_vec_init as *const (),
        )));
    });
}

fn schema_sql(dimensions: usize) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS store_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source TEXT NOT NULL,
    position INTEGER NOT NULL,
    content TEXT NOT NULL,
    created_at DATETIME NOT NULL
);

CREATE VIRTUAL TABLE IF NOT EXISTS vec_records USING vec0(
    embedding FLOAT[{dimensions}]
);
"#
    )
}

/// Summary of a collection's contents.
#[derive(Debug)]
pub struct StoreStats {
    pub records: usize,
    pub last_ingest: Option<DateTime<Utc>>,
}

/// Handle to a persistent collection of embedded chunks.
pub struct VectorStore {
    pub(crate) conn: Connection,
    dimensions: usize,
    collection: String,
}

impl VectorStore {
    /// Open a collection under `dir`, creating the directory and an empty
    /// collection when none exists yet. Idempotent: reopening the same
    /// path and collection name recovers all previously inserted records.
    pub fn open_or_create<P: AsRef<Path>>(
        dir: P,
        collection: &str,
        dimensions: usize,
    ) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let db_path = dir.join(format!("{collection}.db"));
        info!("Opening vector store: {}", db_path.display());

        init_sqlite_vec();
        let conn = Connection::open(&db_path)?;
        Self::init(conn, collection, dimensions)
    }

    /// Open an in-memory collection (useful for testing).
    pub fn open_in_memory(collection: &str, dimensions: usize) -> Result<Self, StoreError> {
        init_sqlite_vec();
        let conn = Connection::open_in_memory()?;
        Self::init(conn, collection, dimensions)
    }

    fn init(conn: Connection, collection: &str, dimensions: usize) -> Result<Self, StoreError> {
        // Verify sqlite-vec is loaded
        let vec_version: String = conn.query_row("SELECT vec_version()", [], |row| row.get(0))?;
        info!("sqlite-vec version: {}", vec_version);

        conn.execute_batch(&schema_sql(dimensions))?;

        // A collection keeps its dimensionality for life; reopening with a
        // different embedding model is an error, not a migration.
        let stored: Option<String> = conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = 'dimensions'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(value) => {
                let expected: usize = value.parse().unwrap_or(0);
                if expected != dimensions {
                    return Err(StoreError::DimensionMismatch {
                        expected,
                        got: dimensions,
                    });
                }
            }
            None => {
                conn.execute(
                    "INSERT INTO store_meta (key, value) VALUES ('dimensions', ?)",
                    params![dimensions.to_string()],
                )?;
                conn.execute(
                    "INSERT INTO store_meta (key, value) VALUES ('collection', ?)",
                    params![collection],
                )?;
            }
        }

        Ok(Self {
            conn,
            dimensions,
            collection: collection.to_string(),
        })
    }

    /// Dimensionality this collection was created with.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Append chunks with their embeddings as new records, in one
    /// transaction. Duplicate text is permitted and simply grows the store.
    pub fn insert(
        &mut self,
        chunks: &[Chunk],
        source: &str,
        embeddings: &[Vec<f32>],
    ) -> Result<(), StoreError> {
        assert_eq!(
            chunks.len(),
            embeddings.len(),
            "chunks and embeddings length mismatch"
        );

        for embedding in embeddings {
            if embedding.len() != self.dimensions {
                return Err(StoreError::DimensionMismatch {
                    expected: self.dimensions,
                    got: embedding.len(),
                });
            }
        }

        let now = Utc::now();
        let tx = self.conn.transaction()?;

        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            tx.execute(
                "INSERT INTO records (source, position, content, created_at) VALUES (?, ?, ?, ?)",
                params![source, chunk.position as i64, chunk.content, now],
            )?;
            let record_id = tx.last_insert_rowid();

            let vector_blob = serialize_vector(embedding);
            tx.execute(
                "INSERT INTO vec_records (rowid, embedding) VALUES (?, ?)",
                params![record_id, vector_blob],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Record count and time of the most recent ingestion.
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let (records, last_ingest): (i64, Option<DateTime<Utc>>) = self.conn.query_row(
            "SELECT COUNT(*), MAX(created_at) FROM records",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(StoreStats {
            records: records as usize,
            last_ingest,
        })
    }
}

/// Helper to serialize a float32 vector into bytes for the vec0 virtual table
pub fn serialize_vector(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

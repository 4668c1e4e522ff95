use super::{StoreError, VectorStore, serialize_vector};

/// A stored record ranked against a query vector.
#[derive(Debug)]
pub struct SearchResult {
    pub record_id: i64,
    pub source: String,
    pub content: String,
    /// Char offset of the chunk in its source document.
    pub position: usize,
    /// Cosine similarity in [-1, 1]; results are ordered non-increasing.
    pub similarity: f64,
}

impl VectorStore {
    /// Return up to `k` records nearest to `query_vector` by cosine distance.
    /// Ties are broken by insertion order (lower rowid first). An empty
    /// collection yields an empty result.
    pub fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<SearchResult>, StoreError> {
        if query_vector.len() != self.dimensions() {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimensions(),
                got: query_vector.len(),
            });
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                r.id,
                r.source,
                r.content,
                r.position,
                vec_distance_cosine(v.embedding, ?) as distance
            FROM vec_records v
            JOIN records r ON v.rowid = r.id
            ORDER BY distance ASC, r.id ASC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(
            rusqlite::params![serialize_vector(query_vector), k as i64],
            |row| {
                let distance: f64 = row.get(4)?;
                Ok(SearchResult {
                    record_id: row.get(0)?,
                    source: row.get(1)?,
                    content: row.get(2)?,
                    position: row.get::<_, i64>(3)? as usize,
                    similarity: 1.0 - distance,
                })
            },
        )?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }

        Ok(results)
    }
}

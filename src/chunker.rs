//! Text chunking for ingestion.
//!
//! Splits raw document text into overlapping windows suitable for embedding.
//! Cuts prefer the coarsest boundary available (paragraph break, then line
//! break, then word boundary) before falling back to a hard character cut.

/// A contiguous piece of a source document.
///
/// Chunks are exact substrings of the input (no trimming), so the original
/// text can be reconstructed from chunk contents and positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub content: String,
    /// Char offset of this chunk in the source text.
    pub position: usize,
}

/// Splits text into chunks of at most `chunk_size` chars (using `char` count),
/// with adjacent chunks overlapping by up to `chunk_overlap` chars.
///
/// Deterministic: the same text and settings always yield the same chunks.
/// Empty or whitespace-only input yields no chunks.
pub fn split_into_chunks(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<Chunk> {
    assert!(chunk_size > 0, "chunk_size must be positive");
    assert!(
        chunk_overlap < chunk_size,
        "chunk_overlap must be smaller than chunk_size"
    );

    if text.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let window_end = (start + chunk_size).min(chars.len());
        let end = if window_end < chars.len() {
            find_cut_point(&chars, start, window_end)
        } else {
            window_end
        };

        chunks.push(Chunk {
            content: chars[start..end].iter().collect(),
            position: start,
        });

        if end == chars.len() {
            break;
        }

        // Step back by the overlap, always making forward progress.
        start = end.saturating_sub(chunk_overlap).max(start + 1);
    }

    chunks
}

/// Finds the cut position for a full window, searching backwards from
/// `window_end` to the middle of the window for the coarsest boundary.
/// Returns `window_end` when no boundary is found (hard cut).
fn find_cut_point(chars: &[char], start: usize, window_end: usize) -> usize {
    let min_cut = start + (window_end - start) / 2;

    // Paragraph break: cut right after a blank line
    for i in (min_cut..=window_end).rev() {
        if i >= start + 2 && chars[i - 1] == '\n' && chars[i - 2] == '\n' {
            return i;
        }
    }

    // Line break
    for i in (min_cut..=window_end).rev() {
        if i > start && chars[i - 1] == '\n' {
            return i;
        }
    }

    // Word boundary
    for i in (min_cut..=window_end).rev() {
        if i > start && chars[i - 1] == ' ' {
            return i;
        }
    }

    window_end
}

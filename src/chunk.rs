//! Overlapping fixed-size text windows.
//!
//! Sizes and offsets count Unicode scalar values (`char`s), never bytes, so
//! windows never split a multi-byte character.

/// Split `text` into windows of at most `chunk_size` characters, where each
/// window after the first starts `overlap` characters before the previous
/// one ended.
///
/// - `chunk_size == 0` returns the whole text as one chunk.
/// - `overlap` is clamped to `chunk_size - 1`.
/// - Empty text yields no chunks.
///
/// The last chunk always ends at the end of `text`, and stripping the first
/// `overlap` characters from every chunk but the first and concatenating
/// reproduces `text`.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<&str> {
    if chunk_size == 0 {
        return vec![text];
    }
    let overlap = overlap.min(chunk_size - 1);

    // Byte offset of every char boundary, including the end of the string.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let n = bounds.len() - 1;

    let mut chunks = Vec::with_capacity(n / (chunk_size - overlap) + 1);
    let mut start = 0;
    while start < n {
        let end = n.min(start + chunk_size);
        chunks.push(&text[bounds[start]..bounds[end]]);
        if end >= n {
            break;
        }
        start = end - overlap;
    }

    log::debug!(
        "chunked {} chars into {} chunks (size={}, overlap={})",
        n,
        chunks.len(),
        chunk_size,
        overlap
    );
    chunks
}

/// Chunk with signed parameters as they arrive from option maps.
///
/// Non-positive `chunk_size` disables splitting; negative `overlap` counts as 0.
pub fn chunk_text_signed(text: &str, chunk_size: i64, overlap: i64) -> Vec<&str> {
    let size = usize::try_from(chunk_size.max(0)).unwrap_or(usize::MAX);
    let overlap = usize::try_from(overlap.max(0)).unwrap_or(usize::MAX);
    chunk_text(text, size, overlap)
}

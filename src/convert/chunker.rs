//! Splitting of over-long paragraphs into store-safe pieces.

/// Default ceiling for one block's text, under the store's 2000 character limit.
pub const MAX_BLOCK_CHARS: usize = 1900;

/// Split `text` into pieces of at most `max_len` characters.
///
/// Text that already fits (including empty text) comes back as the only
/// element, untouched. Longer text is cut at the last newline, else the last
/// `". "`, else the last space within reach, else exactly at `max_len`.
/// Pieces are trimmed and empty pieces dropped.
pub fn chunk(text: &str, max_len: usize) -> Vec<String> {
    if text.is_empty() || text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut remaining = text;

    while remaining.chars().count() > max_len {
        let limit = byte_offset(remaining, max_len);
        let split = ["\n", ". ", " "]
            .iter()
            .find_map(|pat| last_match_starting_by(remaining, limit, pat))
            .unwrap_or(limit);

        pieces.push(remaining[..split].trim().to_string());
        remaining = remaining[split..].trim();
    }

    if !remaining.is_empty() {
        pieces.push(remaining.to_string());
    }

    pieces.retain(|piece| !piece.is_empty());
    pieces
}

/// Byte offset of the `n`th character, or the string length.
fn byte_offset(text: &str, n: usize) -> usize {
    text.char_indices().nth(n).map_or(text.len(), |(i, _)| i)
}

/// Last occurrence of `pat` starting at or before byte `limit`, ignoring a
/// match at offset 0 since it would not shorten the text.
fn last_match_starting_by(text: &str, limit: usize, pat: &str) -> Option<usize> {
    let mut end = (limit + pat.len()).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].rfind(pat).filter(|&at| at > 0)
}

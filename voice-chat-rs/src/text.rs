//! Grapheme-aware text measuring and chunking for the speech engine.
//!
//! VOICEPEAK rejects input above a per-call character limit, and a
//! "character" there means a user-perceived one: kana with dakuten, emoji
//! sequences and combining marks each count once. Lengths are therefore
//! measured in extended grapheme clusters, never bytes or `char`s.

use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_MAX_GRAPHEMES: usize = 140;

/// Number of extended grapheme clusters in `text`.
pub fn grapheme_count(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Remove `\r` and `\n` so a reply reads as one continuous utterance.
pub fn strip_newlines(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

/// Split `text` into consecutive chunks of at most `max_graphemes`
/// graphemes each, after stripping newlines.
///
/// Only the last chunk may be shorter. Empty input gives no chunks.
pub fn split_into_chunks(text: &str, max_graphemes: usize) -> Vec<String> {
    let flat = strip_newlines(text);
    let graphemes: Vec<&str> = flat.graphemes(true).collect();
    graphemes
        .chunks(max_graphemes.max(1))
        .map(|window| window.concat())
        .collect()
}

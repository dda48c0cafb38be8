//! Recursive character text splitter.
//!
//! Splits on the first separator present in the text (`"\n\n"`, then `"\n"`,
//! then `" "`, then between characters), recursing into pieces that are
//! still too long, and merges small pieces back into chunks of at most
//! `chunk_size` characters that share up to `chunk_overlap` characters
//! with their predecessor. Separators stay attached to the start of the
//! piece that follows them. Lengths are counted in `char`s.

use std::collections::VecDeque;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separators: Vec<String>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: vec!["\n\n".into(), "\n".into(), " ".into(), String::new()],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    /// Splitter with the default separators and the given sizes.
    pub fn with_sizes(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self::new(SplitterConfig {
            chunk_size,
            chunk_overlap,
            ..SplitterConfig::default()
        })
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Split `text` into trimmed, non-empty chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.config.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        // First separator that occurs in the text; "" always matches.
        let (separator, rest) = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
            .map(|i| (separators[i].as_str(), &separators[i + 1..]))
            .unwrap_or(("", &[]));

        let mut chunks = Vec::new();
        let mut small: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.config.chunk_size {
                small.push(piece);
                continue;
            }
            if !small.is_empty() {
                chunks.extend(self.merge(&small));
                small.clear();
            }
            if rest.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, rest));
            }
        }

        if !small.is_empty() {
            chunks.extend(self.merge(&small));
        }
        chunks
    }

    /// Greedily pack pieces into chunks, carrying a tail of up to
    /// `chunk_overlap` characters into the next chunk.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let SplitterConfig {
            chunk_size,
            chunk_overlap,
            ..
        } = self.config;

        let mut docs = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > chunk_size {
                if total > chunk_size {
                    warn!(total, chunk_size, "Created a chunk longer than the configured size");
                }
                if !window.is_empty() {
                    push_trimmed(&mut docs, &window);
                    while total > chunk_overlap || (total + len > chunk_size && total > 0) {
                        match window.pop_front() {
                            Some((_, front)) => total -= front,
                            None => break,
                        }
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        push_trimmed(&mut docs, &window);
        docs
    }
}

fn push_trimmed(docs: &mut Vec<String>, window: &VecDeque<(&str, usize)>) {
    let joined: String = window.iter().map(|(p, _)| *p).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `text` on `separator`, attaching each separator to the start of
/// the piece after it. An empty separator splits into single characters.
/// Empty pieces are dropped.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

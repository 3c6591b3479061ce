//! Fixed-size, overlapping character windows over a document.
//!
//! Windows are measured in `char`s so a slice never splits a multi-byte
//! character. The cursor advances by `max_chars - overlap` each step and the
//! final window always ends at the end of the text.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_MAX_CHARS: usize = 5000;
pub const DEFAULT_OVERLAP: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_chars: DEFAULT_MAX_CHARS, overlap: DEFAULT_OVERLAP }
    }
}

impl ChunkingConfig {
    pub fn new(max_chars: usize, overlap: usize) -> Result<Self> {
        let config = Self { max_chars, overlap };
        config.validate()?;
        Ok(config)
    }

    /// `overlap` must be strictly smaller than `max_chars`, otherwise the
    /// cursor would never move forward.
    pub fn validate(&self) -> Result<()> {
        if self.max_chars == 0 {
            return Err(Error::Config("max_chars must be greater than zero".to_string()));
        }
        if self.overlap >= self.max_chars {
            return Err(Error::Config(format!(
                "overlap ({}) must be smaller than max_chars ({})",
                self.overlap, self.max_chars
            )));
        }
        Ok(())
    }

    fn stride(&self) -> usize {
        self.max_chars - self.overlap
    }
}

/// Half-open `[start, end)` range of char offsets covered by one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub start: usize,
    pub end: usize,
}

impl ChunkSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Char-offset spans for every window of a text with `char_count` chars.
pub fn chunk_spans(char_count: usize, config: &ChunkingConfig) -> Result<Vec<ChunkSpan>> {
    config.validate()?;
    let mut spans = Vec::new();
    let mut start = 0usize;
    while start < char_count {
        let end = (start + config.max_chars).min(char_count);
        spans.push(ChunkSpan { start, end });
        if end == char_count {
            break;
        }
        start += config.stride();
    }
    Ok(spans)
}

/// Split `text` into windows of at most `max_chars` chars, each overlapping
/// the previous one by `overlap` chars. Empty text yields no chunks.
pub fn chunk(text: &str, max_chars: usize, overlap: usize) -> Result<Vec<&str>> {
    chunk_with(text, &ChunkingConfig { max_chars, overlap })
}

pub fn chunk_with<'a>(text: &'a str, config: &ChunkingConfig) -> Result<Vec<&'a str>> {
    // Byte offset of every char boundary, including the end of the text.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = bounds.len() - 1;
    let spans = chunk_spans(char_count, config)?;
    Ok(spans
        .iter()
        .map(|span| &text[bounds[span.start]..bounds[span.end]])
        .collect())
}

//! Fixed-size overlapping character windows.
//!
//! Window `i` covers `[i * stride, i * stride + window)` clipped to the text,
//! with `stride = window - overlap`. The split is character based and knows
//! nothing about headings or sentences.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Chunk;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub window: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { window: 400, overlap: 40 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::InvalidConfig("chunking.window must be positive".into()));
        }
        if self.overlap >= self.window {
            return Err(Error::InvalidConfig(format!(
                "chunking.overlap ({}) must be smaller than chunking.window ({})",
                self.overlap, self.window
            )));
        }
        Ok(())
    }

    pub fn stride(&self) -> usize {
        self.window - self.overlap
    }

    /// Number of windows produced for a text of `len` characters:
    /// `ceil(max(len - overlap, 1) / stride)`, or zero for empty text.
    pub fn expected_chunks(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        len.saturating_sub(self.overlap).max(1).div_ceil(self.stride())
    }
}

/// A window borrowed from the source text. Offsets are in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a> {
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    pub fn windows<'a>(&self, text: &'a str) -> Vec<Window<'a>> {
        // byte offset of every char boundary, including the end of the text
        let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let len = bounds.len() - 1;
        let stride = self.config.stride();

        let mut out = Vec::with_capacity(self.config.expected_chunks(len));
        let mut start = 0;
        while start < len {
            let end = (start + self.config.window).min(len);
            out.push(Window { start, end, text: &text[bounds[start]..bounds[end]] });
            if end == len {
                break;
            }
            start += stride;
        }
        out
    }

    pub fn chunk_file(&self, file_path: &str, text: &str) -> Vec<Chunk> {
        self.windows(text)
            .into_iter()
            .map(|w| Chunk { file_path: file_path.to_string(), start: w.start, end: w.end, text: w.text.to_string() })
            .collect()
    }
}

//! Domain types shared by the scanner, vectorizer and query engine.

use serde::{Deserialize, Serialize};

/// A window of a source document that is independently indexed.
///
/// - `file_path`: path of the source file relative to the documentation root
/// - `start`/`end`: character offsets of the window in the source text
/// - `text`: the exact substring between `start` and `end`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub file_path: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Row metadata persisted alongside the document matrix.
///
/// Record `i` describes matrix row `i`. The serialized field names match the
/// on-disk `.vector_meta.jsonl` layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub file: String,
    pub text: String,
}

impl From<Chunk> for ChunkRecord {
    fn from(chunk: Chunk) -> Self {
        Self { file: chunk.file_path, text: chunk.text }
    }
}

/// A ranked query result.
///
/// `score` is the cosine similarity between the query and the chunk; higher
/// is always better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub file: String,
    pub score: f32,
    pub excerpt: String,
}

impl SearchHit {
    /// Markdown-ish rendering used by the command line and tool layers.
    pub fn render(&self) -> String {
        format!(
            "**{}**  (score {:.3})\n\n{}\n\n---\n",
            self.file,
            self.score,
            self.excerpt.trim()
        )
    }
}

/// Output handed to callers outside the engine: either plain text or a
/// structured JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Json(serde_json::Value),
}

impl Content {
    pub fn from_hits(hits: &[SearchHit]) -> Vec<Content> {
        hits.iter().map(|h| Content::Text(h.render())).collect()
    }

    pub fn hits_as_json(hits: &[SearchHit]) -> crate::error::Result<Content> {
        Ok(Content::Json(serde_json::to_value(hits)?))
    }

}

impl std::fmt::Display for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Content::Text(s) => f.write_str(s),
            Content::Json(v) => write!(f, "{v}"),
        }
    }
}

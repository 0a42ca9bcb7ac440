//! On-disk layout of a persisted index.
//!
//! Three artifacts share one directory and always describe the same build:
//! the normalized matrix (`.npy`), the vocabulary with IDF weights (JSON) and
//! the per-row metadata (JSON lines, row order).

use serde::{Deserialize, Serialize};

use docindex_embed::TfidfModel;

pub const MATRIX_FILE: &str = ".vector_index.npy";
pub const VOCAB_FILE: &str = ".tfidf_vocab.json";
pub const META_FILE: &str = ".vector_meta.jsonl";
pub const LOCK_FILE: &str = ".vector_index.lock";

/// Contents of [`VOCAB_FILE`]. Everything past the model is absent in files
/// written by older builds; loading then skips those checks.
///
/// `meta_digest` and `matrix_digest` are xxHash64 digests of the exact
/// [`META_FILE`] and [`MATRIX_FILE`] bytes of the same build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabFile {
    #[serde(flatten)]
    pub model: TfidfModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_digest: Option<String>,
}

use indicatif::{ProgressBar, ProgressStyle};

use docindex_core::data_processor::DataProcessor;
use docindex_core::error::Result;
use docindex_core::types::ChunkRecord;
use docindex_embed::TfidfVectorizer;

use crate::index::VectorIndex;
use crate::store::IndexStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub files: usize,
    pub rows: usize,
    pub terms: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Built(BuildStats),
    /// The corpus produced no chunks; nothing was written and any previous
    /// index is left in place.
    EmptyCorpus,
}

/// Style applied to the per-file progress bar.
pub fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Scan, chunk, fit and persist. Returns the built index so callers can serve
/// queries from it without reading the artifacts back.
pub fn build_index(processor: &DataProcessor, store: &IndexStore, progress: &ProgressBar) -> Result<(BuildOutcome, Option<VectorIndex>)> {
    progress.set_style(progress_style());
    progress.set_length(processor.scanner().files().count() as u64);
    let corpus = processor.process_directory(|rel| {
        progress.set_message(rel.to_string());
        progress.inc(1);
    })?;
    progress.finish_and_clear();

    if corpus.chunks.is_empty() {
        tracing::warn!(root = %processor.scanner().root().display(), files = corpus.files, "corpus is empty; index left unchanged");
        return Ok((BuildOutcome::EmptyCorpus, None));
    }

    let texts: Vec<&str> = corpus.chunks.iter().map(|c| c.text.as_str()).collect();
    let (vectorizer, rows) = TfidfVectorizer::fit_transform(&texts)?;
    let records: Vec<ChunkRecord> = corpus.chunks.into_iter().map(ChunkRecord::from).collect();
    // Hashed from the bytes that were chunked, so an edit racing the build
    // shows up as stale rather than being masked.
    let index = VectorIndex::from_sparse_rows(vectorizer, &rows, records)?.with_fingerprint(Some(corpus.fingerprint));

    store.write(&index)?;
    let stats = BuildStats { files: corpus.files, rows: index.rows(), terms: index.terms() };
    tracing::info!(files = stats.files, rows = stats.rows, terms = stats.terms, "index built");
    Ok((BuildOutcome::Built(stats), Some(index)))
}

//! Process-local query handle over a persisted index.
//!
//! [`DocIndex`] owns the load-or-build path. The first query loads the
//! artifacts (building them if none exist) exactly once, even when several
//! threads race on it; later queries share the same immutable snapshot until
//! [`DocIndex::reset`] drops it.

use std::sync::Arc;

use indicatif::ProgressBar;
use once_cell::sync::OnceCell;

use docindex_core::chunker::Chunker;
use docindex_core::config::Settings;
use docindex_core::data_processor::DataProcessor;
use docindex_core::error::{Error, Result};
use docindex_core::scanner::CorpusScanner;
use docindex_core::traits::SearchEngine;
use docindex_core::types::SearchHit;

use crate::index::VectorIndex;
use crate::index_build::{build_index, BuildOutcome};
use crate::status::{index_status, IndexStatus};
use crate::store::IndexStore;

pub struct DocIndex {
    processor: DataProcessor,
    store: IndexStore,
    loaded: OnceCell<Arc<VectorIndex>>,
}

impl DocIndex {
    pub fn new(processor: DataProcessor, store: IndexStore) -> Self {
        Self { processor, store, loaded: OnceCell::new() }
    }

    /// Engine over the configured docs root, with artifacts in the configured
    /// index directory.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let scanner = CorpusScanner::with_extensions(settings.docs_root(), &settings.docs.extensions);
        let chunker = Chunker::new(settings.chunking)?;
        Ok(Self::new(DataProcessor::new(scanner, chunker), IndexStore::new(settings.index_dir())))
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    pub fn scanner(&self) -> &CorpusScanner {
        self.processor.scanner()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// The in-memory snapshot, loading or building it on first use.
    pub fn index(&self) -> Result<Arc<VectorIndex>> {
        self.loaded
            .get_or_try_init(|| {
                if let Some(index) = self.store.load()? {
                    return Ok(Arc::new(index));
                }
                tracing::info!(dir = %self.store.dir().display(), "no index on disk; building");
                match build_index(&self.processor, &self.store, &ProgressBar::hidden())? {
                    (BuildOutcome::Built(_), Some(index)) => Ok(Arc::new(index)),
                    _ => Err(Error::IndexUnavailable(format!(
                        "no indexable content under {}",
                        self.processor.scanner().root().display()
                    ))),
                }
            })
            .cloned()
    }

    /// Forget the cached snapshot; the next query reads the artifacts again.
    pub fn reset(&mut self) {
        self.loaded.take();
    }

    /// Rebuild the artifacts from the corpus. The cached snapshot, if any,
    /// keeps serving until [`reset`](Self::reset) is called.
    pub fn build(&self, progress: &ProgressBar) -> Result<BuildOutcome> {
        build_index(&self.processor, &self.store, progress).map(|(outcome, _)| outcome)
    }

    pub fn status(&self) -> Result<IndexStatus> {
        index_status(&self.store, self.processor.scanner())
    }

    /// Best `min(k, rows)` chunks for `query`. Only `k == 0` is rejected.
    pub fn semantic_search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Err(Error::InvalidArgument("k must be at least 1".into()));
        }
        self.index()?.search(query, k)
    }
}

impl SearchEngine for DocIndex {
    fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        self.semantic_search(query, k)
    }
}

use std::fmt;
use std::path::PathBuf;

use docindex_core::error::Result;
use docindex_core::fingerprint::corpus_fingerprint;
use docindex_core::scanner::CorpusScanner;

use crate::store::IndexStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStatus {
    pub dir: PathBuf,
    pub built: bool,
    pub rows: Option<usize>,
    pub terms: Option<usize>,
    pub stored_fingerprint: Option<String>,
    pub corpus_fingerprint: String,
}

impl IndexStatus {
    /// `Some(true)` when the corpus changed since the last build, `None` when
    /// there is no build or it carries no fingerprint.
    pub fn is_stale(&self) -> Option<bool> {
        self.stored_fingerprint.as_ref().map(|stored| *stored != self.corpus_fingerprint)
    }
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "index dir: {}", self.dir.display())?;
        if !self.built {
            return writeln!(f, "status:    not built");
        }
        let count = |n: Option<usize>| n.map_or_else(|| "unknown".to_string(), |n| n.to_string());
        writeln!(f, "rows:      {}", count(self.rows))?;
        writeln!(f, "terms:     {}", count(self.terms))?;
        let state = match self.is_stale() {
            Some(false) => "up to date",
            Some(true) => "stale (corpus changed since last build)",
            None => "unknown (no fingerprint recorded)",
        };
        writeln!(f, "status:    {state}")
    }
}

/// Report on the persisted index. Loads the artifacts to count rows and
/// terms but never rebuilds or deletes anything.
pub fn index_status(store: &IndexStore, scanner: &CorpusScanner) -> Result<IndexStatus> {
    let corpus_fingerprint = corpus_fingerprint(scanner)?;
    let loaded = store.load()?;
    Ok(IndexStatus {
        dir: store.dir().to_path_buf(),
        built: loaded.is_some(),
        rows: loaded.as_ref().map(|i| i.rows()),
        terms: loaded.as_ref().map(|i| i.terms()),
        stored_fingerprint: loaded.and_then(|i| i.fingerprint().map(str::to_string)),
        corpus_fingerprint,
    })
}

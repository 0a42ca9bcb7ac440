//! Atomic persistence of an index snapshot.
//!
//! Every artifact is written to a temporary file in the index directory and
//! renamed into place, metadata first and matrix last. The vocabulary file
//! records a digest of the metadata and matrix bytes it was written with, so
//! a crash between two renames leaves artifacts that fail to load with
//! `CorruptIndex` instead of pairing rows with another build's records.
//! Writers hold an exclusive lock on [`LOCK_FILE`], readers a shared one.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use docindex_core::error::{Error, Result};
use docindex_core::fingerprint::digest;
use docindex_core::types::ChunkRecord;
use docindex_embed::TfidfVectorizer;

use crate::index::VectorIndex;
use crate::npy;
use crate::schema::{VocabFile, LOCK_FILE, META_FILE, MATRIX_FILE, VOCAB_FILE};

/// Holds an advisory lock until dropped.
struct IndexLock {
    file: File,
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn matrix_path(&self) -> PathBuf {
        self.dir.join(MATRIX_FILE)
    }

    pub fn vocab_path(&self) -> PathBuf {
        self.dir.join(VOCAB_FILE)
    }

    pub fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    /// True once a build has completed in this directory.
    pub fn exists(&self) -> bool {
        self.matrix_path().is_file()
    }

    pub fn write(&self, index: &VectorIndex) -> Result<()> {
        let mut meta = Vec::new();
        for record in index.records() {
            serde_json::to_writer(&mut meta, record)?;
            meta.push(b'\n');
        }
        let mut matrix = Vec::new();
        npy::write_matrix(&mut matrix, index.matrix())?;
        let vocab = VocabFile {
            model: index.model().clone(),
            rows: Some(index.rows()),
            fingerprint: index.fingerprint().map(str::to_string),
            meta_digest: Some(digest(&meta)),
            matrix_digest: Some(digest(&matrix)),
        };
        let vocab = serde_json::to_vec(&vocab)?;

        fs::create_dir_all(&self.dir)?;
        let _lock = self.lock_exclusive()?;
        self.replace(&self.meta_path(), &meta)?;
        self.replace(&self.vocab_path(), &vocab)?;
        self.replace(&self.matrix_path(), &matrix)?;

        tracing::info!(dir = %self.dir.display(), rows = index.rows(), terms = index.terms(), "index written");
        Ok(())
    }

    /// Load the persisted index, or `None` when no build has completed.
    pub fn load(&self) -> Result<Option<VectorIndex>> {
        if !self.exists() {
            return Ok(None);
        }
        let _lock = self.lock_shared();

        let vocab = self.read_vocab()?;
        let meta = read_artifact(&self.meta_path())?;
        let matrix = read_artifact(&self.matrix_path())?;
        check_digest("metadata", vocab.meta_digest.as_deref(), &meta)?;
        check_digest("matrix", vocab.matrix_digest.as_deref(), &matrix)?;

        let records = parse_records(&meta)?;
        let matrix = npy::read_matrix(matrix.as_slice())?;
        if let Some(rows) = vocab.rows {
            if rows != records.len() {
                return Err(Error::CorruptIndex(format!(
                    "vocabulary was written for {rows} rows, metadata has {}",
                    records.len()
                )));
            }
        }
        let vectorizer = TfidfVectorizer::from_model(vocab.model)?;
        let index = VectorIndex::new(vectorizer, matrix, records)?.with_fingerprint(vocab.fingerprint);
        tracing::debug!(dir = %self.dir.display(), rows = index.rows(), "index loaded");
        Ok(Some(index))
    }

    fn read_vocab(&self) -> Result<VocabFile> {
        let bytes = read_artifact(&self.vocab_path())?;
        serde_json::from_slice(&bytes).map_err(|e| Error::CorruptIndex(format!("vocabulary: {e}")))
    }

    fn replace(&self, target: &Path, bytes: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(target).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    fn open_lock_file(&self) -> std::io::Result<File> {
        OpenOptions::new().create(true).read(true).write(true).truncate(false).open(self.lock_path())
    }

    fn lock_exclusive(&self) -> Result<IndexLock> {
        let file = self.open_lock_file()?;
        FileExt::lock_exclusive(&file)
            .map_err(|e| Error::Operation(format!("acquire index lock {}: {e}", self.lock_path().display())))?;
        Ok(IndexLock { file })
    }

    /// Shared lock for readers. A read-only index directory cannot hold a
    /// lock file; reading proceeds unlocked in that case.
    fn lock_shared(&self) -> Option<IndexLock> {
        let file = match self.open_lock_file() {
            Ok(file) => file,
            Err(err) => {
                tracing::debug!(error = %err, "reading index without lock");
                return None;
            }
        };
        match FileExt::lock_shared(&file) {
            Ok(()) => Some(IndexLock { file }),
            Err(err) => {
                tracing::debug!(error = %err, "reading index without lock");
                None
            }
        }
    }
}

fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::CorruptIndex(format!("{} is missing", path.display()))
        } else {
            Error::Io(err)
        }
    })
}

/// Files written before digests were recorded carry none; they are checked
/// only by shape.
fn check_digest(artifact: &str, expected: Option<&str>, bytes: &[u8]) -> Result<()> {
    match expected {
        Some(expected) if expected != digest(bytes) => Err(Error::CorruptIndex(format!(
            "{artifact} does not belong to the same build as the vocabulary"
        ))),
        _ => Ok(()),
    }
}

fn parse_records(meta: &[u8]) -> Result<Vec<ChunkRecord>> {
    let mut records = Vec::new();
    for (lineno, line) in meta.split(|b| *b == b'\n').enumerate() {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let record = serde_json::from_slice(line)
            .map_err(|e| Error::CorruptIndex(format!("metadata line {}: {e}", lineno + 1)))?;
        records.push(record);
    }
    Ok(records)
}

use std::fs;
use std::path::Path;

use crate::chunker::Chunker;
use crate::error::Result;
use crate::fingerprint::CorpusFingerprint;
use crate::scanner::CorpusScanner;
use crate::types::Chunk;

/// Chunks of a whole corpus, in scan order, plus the fingerprint of the
/// exact bytes they were cut from.
#[derive(Debug, Clone, Default)]
pub struct ProcessedCorpus {
    pub files: usize,
    pub chunks: Vec<Chunk>,
    pub fingerprint: String,
}

/// Scanner + chunker: turns a documentation root into chunks.
#[derive(Debug, Clone)]
pub struct DataProcessor {
    scanner: CorpusScanner,
    chunker: Chunker,
}

impl DataProcessor {
    pub fn new(scanner: CorpusScanner, chunker: Chunker) -> Self {
        Self { scanner, chunker }
    }

    pub fn scanner(&self) -> &CorpusScanner {
        &self.scanner
    }

    /// Read and chunk every file once. `on_file` receives each relative path
    /// after that file has been chunked.
    pub fn process_directory<F>(&self, mut on_file: F) -> Result<ProcessedCorpus>
    where
        F: FnMut(&str),
    {
        let mut corpus = ProcessedCorpus::default();
        let mut fingerprint = CorpusFingerprint::new();
        for file_path in self.scanner.files() {
            let bytes = fs::read(&file_path)?;
            let rel = self.scanner.relative_path(&file_path);
            fingerprint.add_file(&rel, &bytes);

            let chunks = self.chunker.chunk_file(&rel, &decode_text(&bytes));
            tracing::debug!(file = %rel, chunks = chunks.len(), "chunked file");
            corpus.chunks.extend(chunks);
            corpus.files += 1;
            on_file(&rel);
        }
        if corpus.files == 0 {
            tracing::warn!(root = %self.scanner.root().display(), "no indexable files found");
        }
        corpus.fingerprint = fingerprint.finish();
        tracing::debug!(files = corpus.files, chunks = corpus.chunks.len(), "processed corpus");
        Ok(corpus)
    }
}

/// Read a file as UTF-8, dropping undecodable bytes.
pub fn read_file_content(file_path: &Path) -> Result<String> {
    Ok(decode_text(&fs::read(file_path)?))
}

fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.utf8_chunks().map(|chunk| chunk.valid()).collect(),
    }
}

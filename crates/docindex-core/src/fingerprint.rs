//! Content hashes for change detection.

use std::fs;
use std::hash::Hasher;

use twox_hash::XxHash64;

use crate::error::Result;
use crate::scanner::CorpusScanner;

/// Incremental xxHash64 over `(relative path, bytes)` pairs, in the order
/// they are added.
#[derive(Default)]
pub struct CorpusFingerprint {
    hasher: XxHash64,
}

impl CorpusFingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, rel_path: &str, bytes: &[u8]) {
        self.hasher.write(rel_path.as_bytes());
        self.hasher.write_u8(0);
        self.hasher.write_u64(bytes.len() as u64);
        self.hasher.write(bytes);
    }

    /// 16 lowercase hex digits.
    pub fn finish(&self) -> String {
        format!("{:016x}", self.hasher.finish())
    }
}

/// Fingerprint of every file the scanner yields, read fresh from disk.
pub fn corpus_fingerprint(scanner: &CorpusScanner) -> Result<String> {
    let mut fingerprint = CorpusFingerprint::new();
    for path in scanner.files() {
        let bytes = fs::read(&path)?;
        fingerprint.add_file(&scanner.relative_path(&path), &bytes);
    }
    Ok(fingerprint.finish())
}

/// xxHash64 of a single byte buffer, as 16 hex digits.
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    format!("{:016x}", hasher.finish())
}

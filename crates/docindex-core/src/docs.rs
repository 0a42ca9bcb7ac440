//! Read a whole documentation file back in fixed-size pages.

use std::path::{Component, Path};

use crate::data_processor::read_file_content;
use crate::error::{Error, Result};
use crate::scanner::CorpusScanner;

/// Return the file at `rel_path` under the scanner root as consecutive pages
/// of `page_chars` characters. Concatenating the pages yields the file text.
pub fn read_local_doc(scanner: &CorpusScanner, rel_path: &str, page_chars: usize) -> Result<Vec<String>> {
    if page_chars == 0 {
        return Err(Error::InvalidArgument("page size must be positive".into()));
    }
    let rel = Path::new(rel_path);
    if rel.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir)) {
        return Err(Error::InvalidArgument(format!("{rel_path}: parent traversal and absolute paths are not allowed")));
    }
    if !scanner.is_allowed(rel) {
        return Err(Error::InvalidArgument(format!("{rel_path}: unsupported extension")));
    }
    let full = scanner.root().join(rel);
    if !full.is_file() {
        return Err(Error::NotFound(rel_path.to_string()));
    }

    let text = read_file_content(&full)?;
    let chars: Vec<char> = text.chars().collect();
    Ok(chars.chunks(page_chars).map(|page| page.iter().collect()).collect())
}

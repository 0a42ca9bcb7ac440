//! Corpus enumeration.
//!
//! Walks a documentation root and yields regular files whose extension
//! (case-insensitive) is in the allowed set. The walk is lazy and can be
//! restarted by calling [`CorpusScanner::files`] again. Entries are visited in
//! file-name order so a single run over an unchanged tree is deterministic.

use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_EXTENSIONS: [&str; 4] = ["md", "txt", "yml", "yaml"];

#[derive(Debug, Clone)]
pub struct CorpusScanner {
    root: PathBuf,
    extensions: Vec<String>,
}

impl CorpusScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_extensions(root, &DEFAULT_EXTENSIONS)
    }

    /// Extensions may be given with or without the leading dot.
    pub fn with_extensions<S: AsRef<str>>(root: impl Into<PathBuf>, extensions: &[S]) -> Self {
        let extensions = extensions
            .iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self { root: root.into(), extensions }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_allowed(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    pub fn files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(root = %self.root.display(), error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(move |entry| self.is_allowed(entry.path()))
            .map(walkdir::DirEntry::into_path)
    }

    /// Path of `path` relative to the root, always with `/` separators.
    pub fn relative_path(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

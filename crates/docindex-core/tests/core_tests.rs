use std::fs;
use std::io::Write;
use tempfile::TempDir;

use docindex_core::chunker::{Chunker, ChunkingConfig};
use docindex_core::data_processor::DataProcessor;
use docindex_core::scanner::CorpusScanner;

#[test]
fn process_directory_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let file_path = dir.join("a.txt");
    let mut f = fs::File::create(&file_path).unwrap();
    writeln!(f, "Short text").unwrap();

    let processor = DataProcessor::new(CorpusScanner::new(dir), Chunker::default());
    let corpus = processor.process_directory(|_| {}).expect("process");

    assert_eq!(corpus.files, 1);
    assert_eq!(corpus.chunks.len(), 1, "one small file becomes one chunk");
    assert_eq!(corpus.chunks[0].text, "Short text\n");
    assert_eq!(corpus.chunks[0].file_path, "a.txt");
    assert_eq!((corpus.chunks[0].start, corpus.chunks[0].end), (0, 11));
}

#[test]
fn process_directory_counts_match_the_chunker() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir(dir.join("guide")).unwrap();
    fs::write(dir.join("guide/long.md"), "word ".repeat(300)).unwrap();
    fs::write(dir.join("notes.txt"), "alpha bravo").unwrap();
    fs::write(dir.join("empty.yaml"), "").unwrap();
    fs::write(dir.join("ignored.rs"), "fn main() {}").unwrap();

    let processor = DataProcessor::new(CorpusScanner::new(dir), Chunker::default());
    let mut seen = Vec::new();
    let corpus = processor.process_directory(|rel| seen.push(rel.to_string())).expect("process");

    assert_eq!(seen, vec!["empty.yaml", "guide/long.md", "notes.txt"]);
    let cfg = ChunkingConfig::default();
    assert_eq!(corpus.files, 3);
    assert_eq!(corpus.chunks.len(), cfg.expected_chunks(1_500) + 1);
    assert!(corpus.chunks.iter().all(|c| c.file_path != "ignored.rs"));
    assert_eq!(corpus.chunks[0].file_path, "guide/long.md");
}

#[test]
fn invalid_utf8_bytes_are_dropped_not_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("bin.txt"), [b'o', b'k', 0xff, b'!']).unwrap();
    let processor = DataProcessor::new(CorpusScanner::new(tmp.path()), Chunker::default());
    let corpus = processor.process_directory(|_| {}).expect("process");
    assert_eq!(corpus.chunks[0].text, "ok!");
    assert_eq!(corpus.chunks[0].end, 3);
}

#[test]
fn processed_fingerprint_matches_a_fresh_scan() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.md"), "alpha").unwrap();
    fs::write(tmp.path().join("b.txt"), [b'x', 0xff]).unwrap();
    let scanner = CorpusScanner::new(tmp.path());
    let processor = DataProcessor::new(scanner.clone(), Chunker::default());
    let corpus = processor.process_directory(|_| {}).expect("process");
    assert_eq!(corpus.fingerprint, docindex_core::fingerprint::corpus_fingerprint(&scanner).unwrap());
}

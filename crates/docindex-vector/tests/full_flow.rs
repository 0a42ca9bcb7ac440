use std::fs;
use std::path::Path;
use std::sync::Arc;

use indicatif::ProgressBar;
use tempfile::TempDir;

use docindex_core::chunker::Chunker;
use docindex_core::data_processor::DataProcessor;
use docindex_core::error::Error;
use docindex_core::fingerprint::corpus_fingerprint;
use docindex_core::scanner::CorpusScanner;
use docindex_vector::{build_index, BuildOutcome, DocIndex, IndexStore};

fn write_corpus(dir: &Path) {
    fs::create_dir_all(dir.join("guide")).unwrap();
    fs::write(dir.join("guide/install.md"), "Install the server package, then start the server daemon.").unwrap();
    fs::write(dir.join("guide/logging.txt"), "Configure logging output and rotate log files nightly.").unwrap();
    fs::write(dir.join("faq.yaml"), "question: how do I reset my password\nanswer: use the account page").unwrap();
    fs::write(dir.join("notes.py"), "print('not documentation')").unwrap();
}

fn processor(dir: &Path) -> DataProcessor {
    DataProcessor::new(CorpusScanner::new(dir), Chunker::default())
}

fn build(dir: &Path) -> BuildOutcome {
    let processor = processor(dir);
    build_index(&processor, &IndexStore::new(dir), &ProgressBar::hidden()).unwrap().0
}

#[test]
fn build_aligns_matrix_metadata_and_chunks() {
    let tmp = TempDir::new().unwrap();
    let long = "lorem ipsum dolor ".repeat(60);
    fs::write(tmp.path().join("long.md"), &long).unwrap();
    write_corpus(tmp.path());

    let BuildOutcome::Built(stats) = build(tmp.path()) else { panic!("expected a build") };
    let expected_chunks = Chunker::default().config().expected_chunks(long.chars().count()) + 3;
    assert_eq!(stats.files, 4);
    assert_eq!(stats.rows, expected_chunks);

    let store = IndexStore::new(tmp.path());
    let index = store.load().unwrap().unwrap();
    assert_eq!(index.rows(), expected_chunks);
    assert_eq!(index.matrix().nrows(), expected_chunks);
    assert_eq!(index.matrix().ncols(), stats.terms);
    let meta = fs::read_to_string(store.meta_path()).unwrap();
    assert_eq!(meta.lines().count(), expected_chunks);

    for i in 0..index.rows() {
        let norm: f32 = index.row(i).unwrap().vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "row {i} has norm {norm}");
    }
}

#[test]
fn rebuilding_an_unchanged_corpus_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let store = IndexStore::new(tmp.path());

    build(tmp.path());
    let first = store.load().unwrap().unwrap();
    let first_meta = fs::read(store.meta_path()).unwrap();
    build(tmp.path());
    let second = store.load().unwrap().unwrap();

    assert_eq!(first.model(), second.model());
    assert_eq!(first.matrix(), second.matrix());
    assert_eq!(first_meta, fs::read(store.meta_path()).unwrap());
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn k_larger_than_the_index_is_clamped() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let engine = DocIndex::new(processor(tmp.path()), IndexStore::new(tmp.path()));
    let hits = engine.semantic_search("server", 100).unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn empty_corpus_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("script.py"), "x = 1").unwrap();
    assert_eq!(build(tmp.path()), BuildOutcome::EmptyCorpus);
    let store = IndexStore::new(tmp.path());
    assert!(!store.matrix_path().exists());
    assert!(!store.vocab_path().exists());
    assert!(!store.meta_path().exists());
}

#[test]
fn empty_corpus_keeps_the_previous_index() {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    let index_dir = tmp.path().join("index");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("a.md"), "alpha beta gamma").unwrap();
    let store = IndexStore::new(&index_dir);
    let processor = processor(&docs);
    build_index(&processor, &store, &ProgressBar::hidden()).unwrap();
    let before = fs::read(store.matrix_path()).unwrap();

    fs::remove_file(docs.join("a.md")).unwrap();
    let (outcome, _) = build_index(&processor, &store, &ProgressBar::hidden()).unwrap();
    assert_eq!(outcome, BuildOutcome::EmptyCorpus);
    assert_eq!(before, fs::read(store.matrix_path()).unwrap());
}

#[test]
fn repeated_term_file_ranks_first_with_high_score() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("server.md"), "server ".repeat(50)).unwrap();
    fs::write(tmp.path().join("other.md"), "client configuration and logging").unwrap();
    let engine = DocIndex::new(processor(tmp.path()), IndexStore::new(tmp.path()));
    let hits = engine.semantic_search("server", 3).unwrap();
    assert_eq!(hits[0].file, "server.md");
    assert!(hits[0].score > 0.9, "score {}", hits[0].score);
}

#[test]
fn unknown_query_terms_score_zero() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let engine = DocIndex::new(processor(tmp.path()), IndexStore::new(tmp.path()));
    let hits = engine.semantic_search("zyzzyva quokka", 2).unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.score == 0.0));
}

#[test]
fn truncated_matrix_is_reported_as_corrupt() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    build(tmp.path());
    let store = IndexStore::new(tmp.path());
    let bytes = fs::read(store.matrix_path()).unwrap();
    fs::write(store.matrix_path(), &bytes[..bytes.len() - 7]).unwrap();

    let engine = DocIndex::new(processor(tmp.path()), store);
    assert!(matches!(engine.semantic_search("server", 3), Err(Error::CorruptIndex(_))));
    assert!(!engine.is_loaded());
}

#[test]
fn extra_metadata_rows_are_reported_as_corrupt() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    build(tmp.path());
    let store = IndexStore::new(tmp.path());
    let mut meta = fs::read_to_string(store.meta_path()).unwrap();
    meta.push_str("{\"file\":\"ghost.md\",\"text\":\"boo\"}\n");
    fs::write(store.meta_path(), meta).unwrap();
    assert!(matches!(store.load(), Err(Error::CorruptIndex(_))));
}

#[test]
fn concurrent_first_queries_share_one_snapshot() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let engine = Arc::new(DocIndex::new(processor(tmp.path()), IndexStore::new(tmp.path())));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.index().unwrap())
        })
        .collect();
    let snapshots: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(snapshots.iter().all(|s| Arc::ptr_eq(s, &snapshots[0])));
}

#[test]
fn reset_picks_up_a_rebuild() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a.md"), "alpha beta").unwrap();
    let mut engine = DocIndex::new(processor(tmp.path()), IndexStore::new(tmp.path()));
    assert_eq!(engine.index().unwrap().rows(), 1);

    fs::write(tmp.path().join("b.md"), "gamma delta").unwrap();
    engine.build(&ProgressBar::hidden()).unwrap();
    assert_eq!(engine.index().unwrap().rows(), 1);

    engine.reset();
    assert_eq!(engine.index().unwrap().rows(), 2);
}

#[test]
fn status_reports_staleness_without_rebuilding() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    let engine = DocIndex::new(processor(tmp.path()), IndexStore::new(tmp.path()));
    assert!(!engine.status().unwrap().built);

    engine.build(&ProgressBar::hidden()).unwrap();
    let fresh = engine.status().unwrap();
    assert!(fresh.built);
    assert_eq!(fresh.rows, Some(3));
    assert_eq!(fresh.is_stale(), Some(false));

    fs::write(tmp.path().join("new.md"), "fresh content").unwrap();
    let stale = engine.status().unwrap();
    assert_eq!(stale.is_stale(), Some(true));
    assert_eq!(stale.rows, Some(3));
}

#[test]
fn stored_fingerprint_matches_the_indexed_corpus() {
    let tmp = TempDir::new().unwrap();
    write_corpus(tmp.path());
    build(tmp.path());
    let index = IndexStore::new(tmp.path()).load().unwrap().unwrap();
    let fresh = corpus_fingerprint(&CorpusScanner::new(tmp.path())).unwrap();
    assert_eq!(index.fingerprint(), Some(fresh.as_str()));
}

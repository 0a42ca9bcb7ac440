//! docindex-text
//!
//! Text analysis for the TF-IDF vector space: tantivy's tokenizer pipeline
//! for case-folded word runs, plus unigram/bigram term extraction.

pub mod analyzer;
pub mod tantivy_utils;

pub use analyzer::TermAnalyzer;

//! docindex-embed
//!
//! TF-IDF vectorizer. `fit` learns a vocabulary and smoothed IDF weights from
//! the chunk texts of a corpus; `transform` maps any text into the same
//! vector space. Rows are L2-normalized so cosine similarity is a dot product.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use docindex_core::error::{Error, Result};
use docindex_core::traits::{Analyzer, Vectorizer};
use docindex_text::TermAnalyzer;

mod pool;

pub use pool::l2_normalize_sparse;

/// `(column, weight)` pairs sorted by column.
pub type SparseRow = Vec<(usize, f32)>;

/// Learned vocabulary and IDF weights. `idf[i]` belongs to the term whose
/// vocabulary value is `i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TfidfModel {
    pub vocabulary: BTreeMap<String, usize>,
    pub idf: Vec<f32>,
}

impl TfidfModel {
    pub fn dim(&self) -> usize {
        self.idf.len()
    }

    /// Checks that the vocabulary is a bijection onto `0..idf.len()` and
    /// that every weight is finite.
    pub fn validate(&self) -> Result<()> {
        let dim = self.idf.len();
        if self.vocabulary.len() != dim {
            return Err(Error::CorruptIndex(format!(
                "vocabulary has {} terms but idf has {} weights",
                self.vocabulary.len(),
                dim
            )));
        }
        let mut seen = vec![false; dim];
        for (term, &col) in &self.vocabulary {
            if col >= dim || std::mem::replace(&mut seen[col], true) {
                return Err(Error::CorruptIndex(format!("term {term:?} has invalid column {col}")));
            }
        }
        if let Some(bad) = self.idf.iter().position(|w| !w.is_finite()) {
            return Err(Error::CorruptIndex(format!("idf[{bad}] is not finite")));
        }
        Ok(())
    }
}

/// Smoothed inverse document frequency: `ln((1 + n) / (1 + df)) + 1`.
pub fn smoothed_idf(n_docs: usize, df: usize) -> f32 {
    (((1 + n_docs) as f64 / (1 + df) as f64).ln() + 1.0) as f32
}

pub struct TfidfVectorizer {
    analyzer: Box<dyn Analyzer>,
    model: TfidfModel,
}

impl TfidfVectorizer {
    pub fn from_model(model: TfidfModel) -> Result<Self> {
        Self::with_analyzer(model, Box::new(TermAnalyzer::default()))
    }

    pub fn with_analyzer(model: TfidfModel, analyzer: Box<dyn Analyzer>) -> Result<Self> {
        model.validate()?;
        Ok(Self { analyzer, model })
    }

    /// Learn vocabulary and IDF from `docs` and return the normalized row of
    /// every document, in input order.
    pub fn fit_transform<S: AsRef<str>>(docs: &[S]) -> Result<(Self, Vec<SparseRow>)> {
        Self::fit_transform_with(Box::new(TermAnalyzer::default()), docs)
    }

    pub fn fit_transform_with<S: AsRef<str>>(analyzer: Box<dyn Analyzer>, docs: &[S]) -> Result<(Self, Vec<SparseRow>)> {
        let counts: Vec<HashMap<String, u32>> = docs.iter().map(|d| term_counts(analyzer.as_ref(), d.as_ref())).collect();

        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in &counts {
            for term in doc.keys() {
                *df.entry(term.as_str()).or_default() += 1;
            }
        }
        if df.is_empty() {
            return Err(Error::EmptyVocabulary(docs.len()));
        }

        let n_docs = docs.len();
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(df.len());
        for (col, (term, freq)) in df.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), col);
            idf.push(smoothed_idf(n_docs, freq));
        }
        let model = TfidfModel { vocabulary, idf };
        tracing::debug!(docs = n_docs, terms = model.dim(), "fitted tf-idf model");

        let rows = counts.iter().map(|c| model_row(&model, c)).collect();
        Ok((Self { analyzer, model }, rows))
    }

    pub fn model(&self) -> &TfidfModel {
        &self.model
    }

    /// Normalized sparse vector for `text`. Terms outside the vocabulary are
    /// ignored; text without known terms yields an empty row.
    pub fn transform_sparse(&self, text: &str) -> SparseRow {
        model_row(&self.model, &term_counts(self.analyzer.as_ref(), text))
    }
}

impl Vectorizer for TfidfVectorizer {
    fn dim(&self) -> usize {
        self.model.dim()
    }

    fn transform(&self, text: &str) -> Vec<f32> {
        let mut dense = vec![0.0f32; self.model.dim()];
        for (col, w) in self.transform_sparse(text) {
            dense[col] = w;
        }
        dense
    }
}

fn term_counts(analyzer: &dyn Analyzer, text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in analyzer.terms(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

fn model_row(model: &TfidfModel, counts: &HashMap<String, u32>) -> SparseRow {
    let mut row: SparseRow = counts
        .iter()
        .filter_map(|(term, &tf)| model.vocabulary.get(term).map(|&col| (col, tf as f32 * model.idf[col])))
        .collect();
    row.sort_unstable_by_key(|(col, _)| *col);
    l2_normalize_sparse(&mut row);
    row
}

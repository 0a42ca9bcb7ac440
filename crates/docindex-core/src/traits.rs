use crate::error::Result;
use crate::types::SearchHit;

/// Turns raw text into the terms that make up the vector space.
pub trait Analyzer: Send + Sync {
    fn terms(&self, text: &str) -> Vec<String>;
}

/// Maps text into a fixed-dimension term-weight vector.
pub trait Vectorizer: Send + Sync {
    fn dim(&self) -> usize;
    fn transform(&self, text: &str) -> Vec<f32>;
}

pub trait SearchEngine: Send + Sync {
    fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>>;
}

use ndarray::{Array1, Array2, ArrayView1};

use docindex_core::error::{Error, Result};
use docindex_core::traits::Vectorizer;
use docindex_core::types::{ChunkRecord, SearchHit};
use docindex_embed::{SparseRow, TfidfModel, TfidfVectorizer};

use crate::search::cosine_top_k;

/// One row of the index: the chunk metadata and its normalized vector.
#[derive(Debug, Clone, Copy)]
pub struct IndexedRow<'a> {
    pub record: &'a ChunkRecord,
    pub vector: ArrayView1<'a, f32>,
}

/// An immutable, fully aligned index snapshot.
///
/// Matrix row `i` and record `i` describe the same chunk. The constructor
/// checks the alignment and the fields are private, so a value of this type
/// can never pair a score with the wrong excerpt.
pub struct VectorIndex {
    vectorizer: TfidfVectorizer,
    matrix: Array2<f32>,
    records: Vec<ChunkRecord>,
    fingerprint: Option<String>,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("rows", &self.rows())
            .field("terms", &self.terms())
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

impl VectorIndex {
    pub fn new(vectorizer: TfidfVectorizer, matrix: Array2<f32>, records: Vec<ChunkRecord>) -> Result<Self> {
        if matrix.nrows() != records.len() {
            return Err(Error::CorruptIndex(format!(
                "matrix has {} rows but metadata has {} records",
                matrix.nrows(),
                records.len()
            )));
        }
        if matrix.ncols() != vectorizer.dim() {
            return Err(Error::CorruptIndex(format!(
                "matrix has {} columns but the vocabulary has {} terms",
                matrix.ncols(),
                vectorizer.dim()
            )));
        }
        Ok(Self { vectorizer, matrix, records, fingerprint: None })
    }

    /// Densify sparse rows into an `N x V` matrix and pair them with records.
    pub fn from_sparse_rows(vectorizer: TfidfVectorizer, rows: &[SparseRow], records: Vec<ChunkRecord>) -> Result<Self> {
        let mut matrix = Array2::<f32>::zeros((rows.len(), vectorizer.dim()));
        for (mut dense, sparse) in matrix.rows_mut().into_iter().zip(rows) {
            for &(col, w) in sparse {
                dense[col] = w;
            }
        }
        Self::new(vectorizer, matrix, records)
    }

    #[must_use]
    pub fn with_fingerprint(mut self, fingerprint: Option<String>) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    pub fn rows(&self) -> usize {
        self.records.len()
    }

    pub fn terms(&self) -> usize {
        self.vectorizer.dim()
    }

    pub fn model(&self) -> &TfidfModel {
        self.vectorizer.model()
    }

    pub fn matrix(&self) -> &Array2<f32> {
        &self.matrix
    }

    pub fn records(&self) -> &[ChunkRecord] {
        &self.records
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn row(&self, i: usize) -> Option<IndexedRow<'_>> {
        let record = self.records.get(i)?;
        Some(IndexedRow { record, vector: self.matrix.row(i) })
    }

    pub fn query_vector(&self, query: &str) -> Array1<f32> {
        Array1::from(self.vectorizer.transform(query))
    }

    /// Rank every row against `query` and return the best `min(k, rows)`.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let q = self.query_vector(query);
        let ranked = cosine_top_k(self.matrix.view(), q.view(), k)?;
        tracing::debug!(query, k, rows = self.rows(), hits = ranked.len(), "ranked query");
        ranked
            .into_iter()
            .map(|(i, score)| {
                let row = self
                    .row(i)
                    .ok_or_else(|| Error::CorruptIndex(format!("ranked row {i} is out of range")))?;
                Ok(SearchHit { file: row.record.file.clone(), score, excerpt: row.record.text.clone() })
            })
            .collect()
    }
}

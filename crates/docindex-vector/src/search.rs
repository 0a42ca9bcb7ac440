use std::cmp::Ordering;

use ndarray::{ArrayView1, ArrayView2};

use docindex_core::error::{Error, Result};

/// Cosine scores of every row against `query`, best `min(k, rows)` first.
///
/// Rows are assumed unit length (or zero). The query is normalized here, so
/// callers may pass raw weights. Equal scores keep ascending row order.
pub fn cosine_top_k(matrix: ArrayView2<'_, f32>, query: ArrayView1<'_, f32>, k: usize) -> Result<Vec<(usize, f32)>> {
    if k == 0 {
        return Err(Error::InvalidArgument("k must be at least 1".into()));
    }
    if matrix.ncols() != query.len() {
        return Err(Error::InvalidArgument(format!(
            "query has {} dimensions, index has {}",
            query.len(),
            matrix.ncols()
        )));
    }

    let norm = query.dot(&query).sqrt();
    let scale = if norm > 0.0 { 1.0 / norm } else { 0.0 };
    let scores = matrix.dot(&query);

    let mut ranked: Vec<(usize, f32)> = scores.iter().map(|&s| s * scale).enumerate().collect();
    ranked.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(&b.0),
        other => other,
    });
    ranked.truncate(k);
    Ok(ranked)
}

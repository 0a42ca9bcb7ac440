/// L2-normalize `(column, weight)` pairs in place. An all-zero or empty row
/// is left untouched. Returns the norm before normalization.
pub fn l2_normalize_sparse(row: &mut [(usize, f32)]) -> f32 {
    let norm = row.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, w) in row.iter_mut() { *w /= norm; }
    }
    norm
}

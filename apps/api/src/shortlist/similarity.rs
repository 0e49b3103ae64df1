/// Cosine similarity of two embeddings, or `None` when it is undefined.
///
/// Undefined covers empty or mismatched dimensions, a zero-norm vector, and any
/// non-finite intermediate. Accumulates in f64 to keep long vectors stable.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    let score = (dot / denom).clamp(-1.0, 1.0);
    score.is_finite().then_some(score as f32)
}

//! Vector arithmetic used by the builder and the search engine.

use guidedb_core::{Error, Result};

pub fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum()
}

pub fn norm(v: &[f32]) -> f64 {
    dot(v, v).sqrt()
}

/// `dot(a, b) / (|a| * |b|)`, clamped to `[-1, 1]`.
///
/// Fails with `EmbeddingDimension` when the lengths differ and `ZeroVector`
/// when either side has zero norm, so NaN never escapes.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::EmbeddingDimension { expected: a.len(), actual: b.len() });
    }
    let denom = norm(a) * norm(b);
    if denom == 0.0 || !denom.is_finite() {
        return Err(Error::ZeroVector);
    }
    Ok((dot(a, b) / denom).clamp(-1.0, 1.0) as f32)
}

/// Per-dimension arithmetic mean. All vectors must share one length.
pub fn mean_vector(vectors: &[Vec<f32>]) -> Result<Vec<f32>> {
    let first = vectors
        .first()
        .ok_or_else(|| Error::InvalidArgument("cannot average zero vectors".to_string()))?;
    let dim = first.len();
    let mut sums = vec![0f64; dim];
    for v in vectors {
        if v.len() != dim {
            return Err(Error::EmbeddingDimension { expected: dim, actual: v.len() });
        }
        for (acc, x) in sums.iter_mut().zip(v) {
            *acc += f64::from(*x);
        }
    }
    let n = vectors.len() as f64;
    Ok(sums.into_iter().map(|s| (s / n) as f32).collect())
}

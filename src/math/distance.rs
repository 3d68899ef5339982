//! Distance metrics for the nearest-neighbor classifier.

/// Minkowski distance of order `p` (`p = 2` is Euclidean, `p = 1` Manhattan).
///
/// Callers guarantee equal lengths and `p >= 1`.
pub fn minkowski(a: &[f64], b: &[f64], p: f64) -> f64 {
    if p == 2.0 {
        return a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt();
    }
    if p == 1.0 {
        return a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum();
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs().powf(p))
        .sum::<f64>()
        .powf(1.0 / p)
}

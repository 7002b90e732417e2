//! Convergence rate estimate
//!
//! A rough spectral-gap indicator for small chains: power iteration with
//! Euclidean normalization, then a Rayleigh-quotient style eigenvalue
//! estimate `v . (P v)`, reported as `max(0, 1 - |lambda|)`.

use crate::chain::TransitionMatrix;

/// Largest chain for which an estimate is attempted
pub const MAX_ESTIMATE_SIZE: usize = 10;

const ESTIMATE_ITERATIONS: usize = 100;
const MIN_NORM: f64 = 1e-10;

/// Approximate spectral gap, or `None` for chains with fewer than 2 or more
/// than [`MAX_ESTIMATE_SIZE`] states, or when the arithmetic breaks down.
pub fn compute_convergence_rate(matrix: &TransitionMatrix) -> Option<f64> {
    let n = matrix.size();
    if !(2..=MAX_ESTIMATE_SIZE).contains(&n) {
        return None;
    }

    let mut v = vec![1.0 / (n as f64).sqrt(); n];
    for _ in 0..ESTIMATE_ITERATIONS {
        let next = matrix.left_multiply(&v);
        let norm = next.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > MIN_NORM {
            v = next.into_iter().map(|x| x / norm).collect();
        } else {
            break;
        }
    }

    let pv = matrix.right_multiply(&v);
    let eigenvalue: f64 = v.iter().zip(&pv).map(|(a, b)| a * b).sum();

    if !eigenvalue.is_finite() {
        tracing::debug!("Convergence rate estimate is not finite");
        return None;
    }

    Some((1.0 - eigenvalue.abs()).max(0.0))
}

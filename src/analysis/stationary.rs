//! Stationary distribution by power iteration
//!
//! Starting from the uniform vector, `pi <- pi * P` is applied until the
//! largest per-component change drops below the tolerance or the iteration
//! budget runs out. Non-convergence is reported through the result, never as
//! an error.

use crate::analysis::classifier::{self, ChainProperties};
use crate::chain::{State, Transition, TransitionMatrix};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOLERANCE: f64 = 1e-6;
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Power iteration parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationaryOptions {
    /// Infinity-norm threshold between successive vectors
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for StationaryOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Outcome of the stationary computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvergenceAnalysis {
    pub stationary_distribution: Vec<f64>,
    pub converged: bool,
    pub iterations: usize,
    pub chain_properties: ChainProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convergence_rate: Option<f64>,
}

impl ConvergenceAnalysis {
    fn empty() -> Self {
        Self {
            stationary_distribution: Vec::new(),
            converged: false,
            iterations: 0,
            chain_properties: ChainProperties::empty(),
            convergence_rate: None,
        }
    }
}

/// Largest absolute component-wise difference, NaN if any component is NaN
fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, |max: f64, d| {
            if max.is_nan() || d.is_nan() {
                f64::NAN
            } else {
                max.max(d)
            }
        })
}

/// Run power iteration on an already built matrix.
///
/// Returns the distribution, whether it converged and the number of
/// iterations performed.
pub fn power_iteration(
    matrix: &TransitionMatrix,
    options: &StationaryOptions,
) -> (Vec<f64>, bool, usize) {
    let n = matrix.size();
    if n == 0 {
        return (Vec::new(), false, 0);
    }

    let mut distribution = vec![1.0 / n as f64; n];
    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..options.max_iterations {
        let next = matrix.left_multiply(&distribution);
        iterations = iter + 1;

        if max_abs_diff(&distribution, &next) < options.tolerance {
            converged = true;
            break;
        }

        distribution = next;
    }

    let sum: f64 = distribution.iter().sum();
    if sum > 0.0 {
        for p in &mut distribution {
            *p /= sum;
        }
    }

    (distribution, converged, iterations)
}

/// Compute the stationary distribution and structural properties of a chain
pub fn compute_stationary_distribution(
    states: &[State],
    transitions: &[Transition],
    options: &StationaryOptions,
) -> ConvergenceAnalysis {
    if states.is_empty() {
        return ConvergenceAnalysis::empty();
    }

    let matrix = TransitionMatrix::build(states, transitions);
    let (stationary_distribution, converged, iterations) = power_iteration(&matrix, options);

    if converged {
        tracing::debug!("Power iteration converged after {} iterations", iterations);
    } else {
        tracing::debug!(
            "Power iteration did not converge within {} iterations",
            options.max_iterations
        );
    }

    ConvergenceAnalysis {
        stationary_distribution,
        converged,
        iterations,
        chain_properties: classifier::classify(&matrix, states),
        convergence_rate: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_state() -> (Vec<State>, Vec<Transition>) {
        (
            vec![State::new("a", "A"), State::new("b", "B")],
            vec![
                Transition::new("t1", "a", "a", 0.7),
                Transition::new("t2", "a", "b", 0.3),
                Transition::new("t3", "b", "a", 0.4),
                Transition::new("t4", "b", "b", 0.6),
            ],
        )
    }

    #[test]
    fn test_empty_chain() {
        let result = compute_stationary_distribution(&[], &[], &StationaryOptions::default());
        assert!(result.stationary_distribution.is_empty());
        assert!(!result.converged);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.chain_properties, ChainProperties::empty());
    }

    #[test]
    fn test_two_state_chain() {
        let (states, transitions) = two_state();
        let result =
            compute_stationary_distribution(&states, &transitions, &StationaryOptions::default());

        assert!(result.converged);
        assert!(result.iterations < DEFAULT_MAX_ITERATIONS);
        assert!((result.stationary_distribution[0] - 0.571429).abs() < 1e-5);
        assert!((result.stationary_distribution[1] - 0.428571).abs() < 1e-5);
        assert!(result.chain_properties.is_ergodic);
    }

    #[test]
    fn test_fixed_point() {
        let (states, transitions) = two_state();
        let result =
            compute_stationary_distribution(&states, &transitions, &StationaryOptions::default());
        let matrix = TransitionMatrix::build(&states, &transitions);
        let next = matrix.left_multiply(&result.stationary_distribution);

        assert!(max_abs_diff(&next, &result.stationary_distribution) < 1e-5);
        let sum: f64 = result.stationary_distribution.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_periodic_chain_does_not_converge() {
        // Mass oscillates between a and b forever
        let states = vec![State::new("a", "A"), State::new("b", "B"), State::new("c", "C")];
        let transitions = vec![
            Transition::new("t1", "a", "b", 1.0),
            Transition::new("t2", "b", "a", 1.0),
            Transition::new("t3", "c", "a", 1.0),
        ];
        let options = StationaryOptions {
            tolerance: 1e-12,
            max_iterations: 50,
        };
        let result = compute_stationary_distribution(&states, &transitions, &options);

        assert!(!result.converged);
        assert_eq!(result.iterations, 50);
        let sum: f64 = result.stationary_distribution.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rows_leave_vector_unnormalized() {
        let states = vec![State::new("a", "A"), State::new("b", "B")];
        let result = compute_stationary_distribution(&states, &[], &StationaryOptions::default());

        // All mass drains in one step, the zero vector is then a fixed point
        assert!(result.converged);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.stationary_distribution, vec![0.0, 0.0]);
    }

    #[test]
    fn test_nan_probability_never_converges() {
        let states = vec![State::new("a", "A"), State::new("b", "B")];
        let transitions = vec![
            Transition::new("t1", "a", "a", f64::NAN),
            Transition::new("t2", "a", "b", 0.5),
            Transition::new("t3", "b", "a", 1.0),
        ];
        let options = StationaryOptions {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: 20,
        };
        let result = compute_stationary_distribution(&states, &transitions, &options);

        assert!(!result.converged);
        assert_eq!(result.iterations, 20);
        assert!(result.stationary_distribution[0].is_nan());
    }

    #[test]
    fn test_max_abs_diff_propagates_nan() {
        assert!(max_abs_diff(&[0.5, f64::NAN], &[0.5, 0.5]).is_nan());
        assert!(max_abs_diff(&[f64::NAN, 0.0], &[0.5, 0.9]).is_nan());
        assert_eq!(max_abs_diff(&[0.5, 0.1], &[0.25, 0.2]), 0.25);
    }

    #[test]
    fn test_deterministic() {
        let (states, transitions) = two_state();
        let options = StationaryOptions::default();
        let first = compute_stationary_distribution(&states, &transitions, &options);
        let second = compute_stationary_distribution(&states, &transitions, &options);
        assert_eq!(first, second);
    }

    #[test]
    fn test_absorbing_state_reported() {
        let states = vec![State::new("a", "A"), State::new("b", "B")];
        let transitions = vec![
            Transition::new("t1", "a", "a", 1.0),
            Transition::new("t2", "b", "a", 0.5),
            Transition::new("t3", "b", "b", 0.5),
        ];
        let result =
            compute_stationary_distribution(&states, &transitions, &StationaryOptions::default());

        assert!(result.chain_properties.has_absorbing_states);
        assert_eq!(result.chain_properties.absorbing_states, vec!["a".to_string()]);
        assert!(result.converged);
        assert!((result.stationary_distribution[0] - 1.0).abs() < 1e-5);
    }
}

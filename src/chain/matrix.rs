//! Dense transition matrix
//!
//! Row `i` holds the probability mass leaving the `i`-th state of the input
//! slice. Parallel transitions accumulate. Rows are never renormalized.

use crate::chain::{State, Transition};
use serde::Serialize;
use std::collections::HashMap;

/// Row-major `n x n` matrix indexed by state position
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransitionMatrix {
    rows: Vec<Vec<f64>>,
}

impl TransitionMatrix {
    /// Build the matrix for `states` from `transitions`.
    ///
    /// A repeated state id maps to its first occurrence. Transitions with an
    /// endpoint that matches no state are skipped.
    pub fn build(states: &[State], transitions: &[Transition]) -> Self {
        let n = states.len();
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
        for (i, state) in states.iter().enumerate() {
            index.entry(state.id.as_str()).or_insert(i);
        }

        let mut rows = vec![vec![0.0; n]; n];
        for transition in transitions {
            match (
                index.get(transition.from.as_str()),
                index.get(transition.to.as_str()),
            ) {
                (Some(&from), Some(&to)) => rows[from][to] += transition.probability,
                _ => tracing::debug!(
                    "Skipping transition {} ({} -> {}): unknown endpoint",
                    transition.id,
                    transition.from,
                    transition.to
                ),
            }
        }

        Self { rows }
    }

    /// Wrap an existing square matrix
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == rows.len()));
        Self { rows }
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.rows[i][j]
    }

    pub fn row_sum(&self, i: usize) -> f64 {
        self.rows[i].iter().sum()
    }

    /// Connectivity only: any positive mass counts as an edge
    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        self.rows[i][j] > 0.0
    }

    /// Row vector times matrix: `out[j] = sum_i v[i] * P[i][j]`
    pub fn left_multiply(&self, v: &[f64]) -> Vec<f64> {
        let n = self.size();
        let mut out = vec![0.0; n];
        for (i, row) in self.rows.iter().enumerate() {
            for (j, p) in row.iter().enumerate() {
                out[j] += v[i] * p;
            }
        }
        out
    }

    /// Matrix times column vector: `out[i] = sum_j P[i][j] * v[j]`
    pub fn right_multiply(&self, v: &[f64]) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row.iter().zip(v).map(|(p, x)| p * x).sum())
            .collect()
    }

    pub fn as_rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}

/// Build the dense matrix for a state/transition pair
pub fn build_transition_matrix(states: &[State], transitions: &[Transition]) -> TransitionMatrix {
    TransitionMatrix::build(states, transitions)
}

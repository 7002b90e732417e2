//! Analysis module - stationary distribution, structure and convergence
//!
//! All routines are pure functions over borrowed input. They never fail:
//! degenerate chains produce degenerate but well-formed results.

use crate::chain::{MarkovChain, StateId, TransitionMatrix};
use serde::Serialize;

pub mod classifier;
pub mod convergence;
pub mod stationary;

// Re-export key types
pub use classifier::{
    ChainProperties, classify, find_absorbing_states, find_communicating_classes, is_aperiodic,
    is_irreducible,
};
pub use convergence::compute_convergence_rate;
pub use stationary::{ConvergenceAnalysis, StationaryOptions, compute_stationary_distribution};

/// Everything known about a chain after a full analysis
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// State ids in matrix order
    pub state_ids: Vec<StateId>,
    pub matrix: TransitionMatrix,
    #[serde(flatten)]
    pub convergence: ConvergenceAnalysis,
}

impl ChainReport {
    /// Stationary probability paired with its state id
    pub fn distribution(&self) -> impl Iterator<Item = (&str, f64)> {
        self.state_ids
            .iter()
            .map(String::as_str)
            .zip(self.convergence.stationary_distribution.iter().copied())
    }
}

/// Stationary distribution, structural properties and convergence rate in one pass
pub fn analyze_chain(chain: &MarkovChain, options: &StationaryOptions) -> ChainReport {
    let matrix = TransitionMatrix::build(&chain.states, &chain.transitions);
    let mut convergence =
        compute_stationary_distribution(&chain.states, &chain.transitions, options);
    convergence.convergence_rate = compute_convergence_rate(&matrix);

    tracing::debug!(
        "Analyzed chain with {} states: converged={}, ergodic={}",
        chain.states.len(),
        convergence.converged,
        convergence.chain_properties.is_ergodic
    );

    ChainReport {
        name: chain.name.clone(),
        state_ids: chain.state_ids(),
        matrix,
        convergence,
    }
}

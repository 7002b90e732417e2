//! Chain module - the graph model shared by every analysis
//!
//! A [`MarkovChain`] is an ordered list of states plus a list of transitions.
//! Analyses borrow it read-only; nothing here normalizes or repairs the input.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod graph;
pub mod matrix;
pub mod state;
pub mod transition;

// Re-export key types
pub use graph::{ChainGraph, GraphStats};
pub use matrix::TransitionMatrix;
pub use state::{State, StateId};
pub use transition::Transition;

/// Row sums within this distance of 1 count as stochastic
pub const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// States and transitions as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkovChain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub states: Vec<State>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

impl MarkovChain {
    pub fn new(states: Vec<State>, transitions: Vec<Transition>) -> Self {
        Self {
            name: None,
            states,
            transitions,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// First state with the given id
    pub fn state(&self, id: &str) -> Option<&State> {
        self.states.iter().find(|s| s.id == id)
    }

    /// Transitions leaving `id`, in document order
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Transition> + 'a {
        self.transitions.iter().filter(move |t| t.from == id)
    }

    pub fn initial_states(&self) -> Vec<&State> {
        self.states.iter().filter(|s| s.is_initial).collect()
    }

    pub fn final_states(&self) -> Vec<&State> {
        self.states.iter().filter(|s| s.is_final).collect()
    }

    /// True when at least one transition carries a non-empty label
    pub fn is_labeled(&self) -> bool {
        self.transitions.iter().any(|t| t.symbol().is_some())
    }

    pub fn state_ids(&self) -> Vec<StateId> {
        self.states.iter().map(|s| s.id.clone()).collect()
    }

    /// Check the chain for well-formedness.
    ///
    /// Advisory only: the analyses accept malformed chains as they are.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        let mut seen = HashSet::new();
        for state in &self.states {
            if !seen.insert(state.id.as_str()) {
                report
                    .errors
                    .push(format!("Duplicate state id '{}'", state.id));
            }
        }

        for transition in &self.transitions {
            for endpoint in [&transition.from, &transition.to] {
                if !seen.contains(endpoint.as_str()) {
                    report.errors.push(format!(
                        "Transition '{}' references unknown state '{}'",
                        transition.id, endpoint
                    ));
                }
            }
            if !(0.0..=1.0).contains(&transition.probability) {
                report.errors.push(format!(
                    "Transition '{}' has probability {} outside [0, 1]",
                    transition.id, transition.probability
                ));
            }
        }

        let mut checked = HashSet::new();
        for state in &self.states {
            if !checked.insert(state.id.as_str()) {
                continue;
            }
            let mut outgoing = self.outgoing(&state.id).peekable();
            if outgoing.peek().is_none() {
                report
                    .warnings
                    .push(format!("State '{}' has no outgoing transitions", state.id));
                continue;
            }
            let sum: f64 = outgoing.map(|t| t.probability).sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                report.errors.push(format!(
                    "Outgoing probabilities of state '{}' sum to {:.6}, expected 1",
                    state.id, sum
                ));
            }
        }

        report
    }
}

/// Findings of [`MarkovChain::validate`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> MarkovChain {
        MarkovChain::new(
            vec![State::new("s", "Sunny").initial(), State::new("r", "Rainy")],
            vec![
                Transition::new("t1", "s", "s", 0.7),
                Transition::new("t2", "s", "r", 0.3),
                Transition::new("t3", "r", "s", 0.4),
                Transition::new("t4", "r", "r", 0.6),
            ],
        )
    }

    #[test]
    fn test_lookups() {
        let chain = weather();
        assert_eq!(chain.state("r").map(|s| s.name.as_str()), Some("Rainy"));
        assert!(chain.state("x").is_none());
        assert_eq!(chain.outgoing("s").count(), 2);
        assert_eq!(chain.initial_states().len(), 1);
        assert!(chain.final_states().is_empty());
        assert!(!chain.is_labeled());
    }

    #[test]
    fn test_valid_chain() {
        let report = weather().validate();
        assert!(report.is_valid(), "{:?}", report);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_validation_findings() {
        let mut chain = weather();
        chain.states.push(State::new("s", "Duplicate"));
        chain.states.push(State::new("dead", "Dead end"));
        chain.transitions.push(Transition::new("t5", "r", "ghost", 0.2));
        chain.transitions.push(Transition::new("t6", "s", "r", -0.1));

        let report = chain.validate();
        assert!(!report.is_valid());
        assert!(report.errors.iter().any(|e| e.contains("Duplicate state id 's'")));
        assert!(report.errors.iter().any(|e| e.contains("unknown state 'ghost'")));
        assert!(report.errors.iter().any(|e| e.contains("outside [0, 1]")));
        assert!(report.errors.iter().any(|e| e.contains("state 'r' sum to 1.2")));
        assert!(report.errors.iter().any(|e| e.contains("state 's' sum to 0.9")));
        assert_eq!(
            report.warnings,
            vec!["State 'dead' has no outgoing transitions".to_string()]
        );
    }
}

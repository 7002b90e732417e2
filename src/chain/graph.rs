use crate::chain::{MarkovChain, ROW_SUM_TOLERANCE, State, StateId, Transition};
use petgraph::Direction;
use petgraph::prelude::EdgeRef;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use std::collections::HashMap;

/// A directed graph view of a [`MarkovChain`].
///
/// The analyses work on the dense [`TransitionMatrix`](super::TransitionMatrix);
/// this view exists for statistics and Graphviz export.
pub struct ChainGraph {
    /// Nodes are states, edges are the individual (unaggregated) transitions.
    pub graph: StableGraph<State, Transition>,

    /// Lookup from state id to node. The first state with a given id wins.
    pub state_index: HashMap<StateId, NodeIndex>,

    /// Optional chain name, used as the DOT graph label.
    pub name: Option<String>,
}

impl ChainGraph {
    pub fn new(name: Option<String>) -> Self {
        Self {
            graph: StableGraph::new(),
            state_index: HashMap::new(),
            name,
        }
    }

    /// Adds a state to the graph and updates the state index.
    pub fn add_state(&mut self, state: State) -> NodeIndex {
        let id = state.id.clone();
        let node_index = self.graph.add_node(state);
        self.state_index.entry(id).or_insert(node_index);
        node_index
    }

    /// Adds a transition to the graph, linking two existing states.
    pub fn add_transition(&mut self, transition: Transition) -> Option<EdgeIndex> {
        if let (Some(&from_idx), Some(&to_idx)) = (
            self.state_index.get(&transition.from),
            self.state_index.get(&transition.to),
        ) {
            Some(self.graph.add_edge(from_idx, to_idx, transition))
        } else {
            None
        }
    }

    pub fn from_chain(chain: &MarkovChain) -> Self {
        let mut graph = Self::new(chain.name.clone());

        for state in &chain.states {
            graph.add_state(state.clone());
        }

        for transition in &chain.transitions {
            if graph.add_transition(transition.clone()).is_none() {
                tracing::debug!(
                    "Transition {} not added to graph: unknown endpoint",
                    transition.id
                );
            }
        }

        graph
    }

    /// Find all states flagged as initial
    pub fn find_initial_states(&self) -> Vec<&State> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx))
            .filter(|state| state.is_initial)
            .collect()
    }

    /// Find all terminal states (no outgoing edges)
    pub fn find_terminal_states(&self) -> Vec<&State> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.edges_directed(idx, Direction::Outgoing).count() == 0)
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect()
    }

    /// A node whose whole outgoing mass loops back to itself
    fn is_absorbing(&self, idx: NodeIndex) -> bool {
        let mut self_mass = 0.0;
        let mut total = 0.0;
        for edge in self.graph.edges_directed(idx, Direction::Outgoing) {
            total += edge.weight().probability;
            if edge.target() == idx {
                self_mass += edge.weight().probability;
            }
        }
        (self_mass - 1.0).abs() < ROW_SUM_TOLERANCE && (total - 1.0).abs() < ROW_SUM_TOLERANCE
    }

    /// Export to DOT format for Graphviz
    pub fn to_dot(&self) -> String {
        let mut dot = "digraph MarkovChain {\n".to_string();
        dot.push_str("  rankdir=LR;\n");
        if let Some(name) = &self.name {
            dot.push_str(&format!("  label=\"{}\";\n", escape(name)));
        }
        dot.push_str("  node [shape=circle, style=filled, fillcolor=white];\n\n");

        // Add nodes
        for idx in self.graph.node_indices() {
            if let Some(state) = self.graph.node_weight(idx) {
                let mut attrs = vec![format!("label=\"{}\"", escape(state.display_name()))];
                if state.is_final {
                    attrs.push("shape=doublecircle".to_string());
                }
                if state.is_initial {
                    attrs.push("fillcolor=\"lightblue\"".to_string());
                } else if self.is_absorbing(idx) {
                    attrs.push("fillcolor=\"orange\"".to_string());
                }

                dot.push_str(&format!(
                    "  \"{}\" [{}];\n",
                    escape(&state.id),
                    attrs.join(", ")
                ));
            }
        }

        dot.push('\n');

        // Add edges
        for edge_idx in self.graph.edge_indices() {
            if let Some((from_idx, to_idx)) = self.graph.edge_endpoints(edge_idx)
                && let (Some(from_state), Some(to_state), Some(transition)) = (
                    self.graph.node_weight(from_idx),
                    self.graph.node_weight(to_idx),
                    self.graph.edge_weight(edge_idx),
                )
            {
                dot.push_str(&format!(
                    "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                    escape(&from_state.id),
                    escape(&to_state.id),
                    escape(&transition.display_label())
                ));
            }
        }

        dot.push_str("}\n");
        dot
    }

    /// Get graph statistics
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            total_states: self.graph.node_count(),
            total_transitions: self.graph.edge_count(),
            initial_states: self.find_initial_states().len(),
            terminal_states: self.find_terminal_states().len(),
            self_loops: self
                .graph
                .edge_indices()
                .filter_map(|e| self.graph.edge_endpoints(e))
                .filter(|(a, b)| a == b)
                .count(),
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GraphStats {
    pub total_states: usize,
    pub total_transitions: usize,
    pub initial_states: usize,
    pub terminal_states: usize,
    pub self_loops: usize,
}

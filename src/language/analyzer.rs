//! Language recognized by a labeled chain

use crate::chain::MarkovChain;
use crate::generation::LcgRng;
use crate::language::automaton::Automaton;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Number of accepted and rejected example words reported
pub const EXAMPLE_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LanguageType {
    Regular,
    ContextFree,
    Unknown,
}

impl LanguageType {
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageType::Regular => "regular",
            LanguageType::ContextFree => "context-free",
            LanguageType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageProperties {
    pub is_finite: bool,
    pub is_empty: bool,
    pub is_universal: bool,
    pub alphabet: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageAnalysis {
    pub language_type: LanguageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_expression: Option<String>,
    pub accepted_examples: Vec<String>,
    pub rejected_examples: Vec<String>,
    pub properties: LanguageProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// True when no final state is reachable from any initial state
pub fn is_empty_language(automaton: &Automaton<'_>) -> bool {
    let initial = automaton.initial_states();
    if initial.is_empty() || automaton.final_states().is_empty() {
        return true;
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = initial.into_iter().map(|s| s.id.as_str()).collect();

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        if automaton.is_final(current) {
            return false;
        }
        for edge in automaton.edges(current) {
            if !visited.contains(edge.to.as_str()) {
                queue.push_back(edge.to.as_str());
            }
        }
    }

    true
}

/// True when no cycle is reachable from an initial state before a final
/// state is hit. Without final states the answer is `false`.
///
/// Iterative DFS over a successor index built once, so path length is
/// bounded by the heap rather than the call stack.
pub fn is_finite_language(automaton: &Automaton<'_>) -> bool {
    if automaton.final_states().is_empty() {
        return false;
    }

    let chain = automaton.chain();
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
    for transition in chain.transitions.iter().filter(|t| t.symbol().is_some()) {
        successors
            .entry(transition.from.as_str())
            .or_default()
            .push(transition.to.as_str());
    }
    let mut accepting: HashMap<&str, bool> = HashMap::new();
    for state in &chain.states {
        accepting.entry(state.id.as_str()).or_insert(state.is_final);
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut on_stack: HashSet<&str> = HashSet::new();
    // (state, index of the next successor to explore)
    let mut stack: Vec<(&str, usize)> = Vec::new();

    for start in automaton.initial_states() {
        let start = start.id.as_str();
        if on_stack.contains(start) {
            return false;
        }
        if !visited.insert(start) || accepting.get(start).copied().unwrap_or(false) {
            continue;
        }
        on_stack.insert(start);
        stack.push((start, 0));

        while let Some(top) = stack.last_mut() {
            let (state, next) = *top;
            top.1 += 1;

            match successors.get(state).and_then(|targets| targets.get(next)) {
                Some(&to) => {
                    if on_stack.contains(to) {
                        return false;
                    }
                    if !visited.insert(to) || accepting.get(to).copied().unwrap_or(false) {
                        continue;
                    }
                    on_stack.insert(to);
                    stack.push((to, 0));
                }
                None => {
                    on_stack.remove(state);
                    stack.pop();
                }
            }
        }
    }

    true
}

/// Sufficient, not exhaustive, universality test: every state is final and
/// every state has exactly one distinct label per alphabet symbol.
pub fn is_universal_language(automaton: &Automaton<'_>) -> bool {
    let alphabet = automaton.alphabet();
    if alphabet.is_empty() || automaton.initial_states().is_empty() {
        return false;
    }

    let states = &automaton.chain().states;
    if !states.iter().all(|s| s.is_final) {
        return false;
    }

    states
        .iter()
        .all(|s| automaton.labels_from(s.id.as_str()).len() == alphabet.len())
}

/// Regular expression for the one-state accepting loop, `None` otherwise.
///
/// No general automaton-to-expression conversion is attempted.
pub fn compute_regular_expression(automaton: &Automaton<'_>) -> Option<String> {
    let alphabet = automaton.alphabet();
    if alphabet.is_empty() {
        return None;
    }

    match automaton.chain().states.as_slice() {
        [state] if state.is_initial && state.is_final => Some(if alphabet.len() == 1 {
            format!("{}*", alphabet[0])
        } else {
            format!("({})*", alphabet.join("|"))
        }),
        _ => None,
    }
}

fn not_an_automaton() -> LanguageAnalysis {
    LanguageAnalysis {
        language_type: LanguageType::Unknown,
        regular_expression: None,
        accepted_examples: Vec::new(),
        rejected_examples: Vec::new(),
        properties: LanguageProperties::default(),
        description: Some("Not a finite automaton (no transition labels)".to_string()),
    }
}

/// Analyze with a clock-seeded generator for rejected examples
pub fn analyze_language(chain: &MarkovChain) -> LanguageAnalysis {
    analyze_with(chain, LcgRng::from_clock())
}

/// Analyze with a fixed seed so rejected examples are reproducible
pub fn analyze_language_seeded(chain: &MarkovChain, seed: u64) -> LanguageAnalysis {
    analyze_with(chain, LcgRng::new(seed))
}

fn analyze_with(chain: &MarkovChain, mut rng: LcgRng) -> LanguageAnalysis {
    let Some(automaton) = Automaton::new(chain) else {
        return not_an_automaton();
    };

    let properties = LanguageProperties {
        is_finite: is_finite_language(&automaton),
        is_empty: is_empty_language(&automaton),
        is_universal: is_universal_language(&automaton),
        alphabet: automaton.alphabet(),
    };

    let (accepted_examples, rejected_examples) = if properties.is_empty {
        (Vec::new(), Vec::new())
    } else {
        (
            automaton.accepted_examples(EXAMPLE_COUNT),
            automaton.rejected_examples(EXAMPLE_COUNT, &mut rng),
        )
    };

    let description = if properties.is_empty {
        "Empty language (no accepting paths)"
    } else if properties.is_universal {
        "Universal language (accepts all strings)"
    } else if properties.is_finite {
        "Finite language (finite set of strings)"
    } else {
        "Infinite regular language"
    };

    tracing::debug!(
        "Language over {:?}: empty={}, finite={}, universal={}",
        properties.alphabet,
        properties.is_empty,
        properties.is_finite,
        properties.is_universal
    );

    LanguageAnalysis {
        // Labeled transitions without stack operations recognize regular languages
        language_type: LanguageType::Regular,
        regular_expression: compute_regular_expression(&automaton),
        accepted_examples,
        rejected_examples,
        properties,
        description: Some(description.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{State, Transition};

    fn single_loop(labels: &[&str]) -> MarkovChain {
        MarkovChain::new(
            vec![State::new("q", "q").initial().accepting()],
            labels
                .iter()
                .enumerate()
                .map(|(i, l)| Transition::new(format!("t{i}"), "q", "q", 1.0).with_label(*l))
                .collect(),
        )
    }

    /// Accepts exactly "ab"
    fn just_ab() -> MarkovChain {
        MarkovChain::new(
            vec![
                State::new("q0", "q0").initial(),
                State::new("q1", "q1"),
                State::new("q2", "q2").accepting(),
            ],
            vec![
                Transition::new("t1", "q0", "q1", 1.0).with_label("a"),
                Transition::new("t2", "q1", "q2", 1.0).with_label("b"),
            ],
        )
    }

    #[test]
    fn test_unlabeled_chain() {
        let chain = MarkovChain::new(
            vec![State::new("a", "A")],
            vec![Transition::new("t1", "a", "a", 1.0)],
        );
        let analysis = analyze_language_seeded(&chain, 1);
        assert_eq!(analysis.language_type, LanguageType::Unknown);
        assert!(analysis.accepted_examples.is_empty());
        assert_eq!(analysis.properties, LanguageProperties::default());
    }

    #[test]
    fn test_no_final_state_is_empty() {
        let chain = MarkovChain::new(
            vec![State::new("q0", "q0").initial(), State::new("q1", "q1")],
            vec![Transition::new("t1", "q0", "q1", 1.0).with_label("a")],
        );
        let analysis = analyze_language_seeded(&chain, 1);
        assert!(analysis.properties.is_empty);
        assert!(!analysis.properties.is_finite);
        assert!(analysis.accepted_examples.is_empty());
        assert!(analysis.rejected_examples.is_empty());
        assert_eq!(
            analysis.description.as_deref(),
            Some("Empty language (no accepting paths)")
        );
    }

    #[test]
    fn test_unreachable_final_is_empty() {
        let chain = MarkovChain::new(
            vec![
                State::new("q0", "q0").initial(),
                State::new("q1", "q1").accepting(),
            ],
            vec![
                Transition::new("t1", "q0", "q0", 1.0).with_label("a"),
                // Unlabeled edges are not automaton moves
                Transition::new("t2", "q0", "q1", 0.0),
            ],
        );
        let automaton = Automaton::new(&chain).unwrap();
        assert!(is_empty_language(&automaton));
    }

    #[test]
    fn test_finite_language() {
        let chain = just_ab();
        let analysis = analyze_language_seeded(&chain, 4);
        assert!(!analysis.properties.is_empty);
        assert!(analysis.properties.is_finite);
        assert!(!analysis.properties.is_universal);
        assert_eq!(analysis.accepted_examples, vec!["ab".to_string()]);
        assert!(!analysis.rejected_examples.contains(&"ab".to_string()));
        assert_eq!(
            analysis.description.as_deref(),
            Some("Finite language (finite set of strings)")
        );
        assert_eq!(analysis.regular_expression, None);
    }

    #[test]
    fn test_cycle_makes_language_infinite() {
        let mut chain = just_ab();
        chain
            .transitions
            .push(Transition::new("t3", "q1", "q0", 0.5).with_label("c"));
        let automaton = Automaton::new(&chain).unwrap();
        assert!(!is_finite_language(&automaton));
    }

    /// `q0 -a-> q1 -a-> ... -a-> q{n-1}`, only the last state accepting
    fn long_path(n: usize) -> MarkovChain {
        let states = (0..n)
            .map(|i| {
                let state = State::new(format!("q{i}"), format!("q{i}"));
                match i {
                    0 => state.initial(),
                    i if i == n - 1 => state.accepting(),
                    _ => state,
                }
            })
            .collect();
        let transitions = (1..n)
            .map(|i| {
                Transition::new(format!("t{i}"), format!("q{}", i - 1), format!("q{i}"), 1.0)
                    .with_label("a")
            })
            .collect();
        MarkovChain::new(states, transitions)
    }

    #[test]
    fn test_long_path_does_not_exhaust_stack() {
        let chain = long_path(200_000);
        let automaton = Automaton::new(&chain).unwrap();
        assert!(is_finite_language(&automaton));
    }

    #[test]
    fn test_cycle_at_end_of_long_path() {
        let mut chain = long_path(200_000);
        let last = chain.states.len() - 1;
        chain.states[last].is_final = false;
        chain.states.push(State::new("done", "done").accepting());
        chain.transitions.push(
            Transition::new("back", format!("q{last}"), format!("q{}", last - 1), 1.0)
                .with_label("b"),
        );
        let automaton = Automaton::new(&chain).unwrap();
        assert!(!is_finite_language(&automaton));
    }

    #[test]
    fn test_cycle_behind_final_state_is_ignored() {
        // Exploration stops at q2, so the q2 <-> q3 loop is never seen
        let mut chain = just_ab();
        chain.states.push(State::new("q3", "q3"));
        chain.transitions.push(Transition::new("t3", "q2", "q3", 1.0).with_label("a"));
        chain.transitions.push(Transition::new("t4", "q3", "q2", 1.0).with_label("a"));
        let automaton = Automaton::new(&chain).unwrap();
        assert!(is_finite_language(&automaton));
    }

    #[test]
    fn test_universal_single_loop() {
        let chain = single_loop(&["a", "b"]);
        let analysis = analyze_language_seeded(&chain, 2);
        assert!(analysis.properties.is_universal);
        assert_eq!(analysis.regular_expression.as_deref(), Some("(a|b)*"));
        assert!(analysis.rejected_examples.is_empty());
        assert_eq!(
            analysis.description.as_deref(),
            Some("Universal language (accepts all strings)")
        );
        assert_eq!(analysis.accepted_examples.len(), 2);
    }

    #[test]
    fn test_single_symbol_expression() {
        let chain = single_loop(&["a"]);
        let automaton = Automaton::new(&chain).unwrap();
        assert_eq!(compute_regular_expression(&automaton).as_deref(), Some("a*"));
    }

    #[test]
    fn test_incomplete_automaton_is_not_universal() {
        let mut chain = single_loop(&["a", "b"]);
        chain.states.push(State::new("sink", "sink").accepting());
        chain
            .transitions
            .push(Transition::new("t9", "sink", "sink", 1.0).with_label("a"));
        let automaton = Automaton::new(&chain).unwrap();
        assert!(!is_universal_language(&automaton));
    }

    #[test]
    fn test_seeded_analysis_is_reproducible() {
        let chain = just_ab();
        assert_eq!(
            analyze_language_seeded(&chain, 99),
            analyze_language_seeded(&chain, 99)
        );
    }
}

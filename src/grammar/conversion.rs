//! Chains to grammars and back
//!
//! Automaton mode reads a labeled chain as an NFA and writes the usual
//! right-linear grammar: one variable per state, `A → aB` per labeled move
//! and `A → ε` per accepting state. Probabilistic mode ignores labels and
//! uses the lowercased name of the target state as the terminal, keeping
//! each move's probability.

use crate::chain::{MarkovChain, State, Transition};
use crate::grammar::{Grammar, Production, validate_grammar};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

/// State id used for the accepting sink of terminal-only alternatives
pub const ACCEPT_STATE_ID: &str = "accept";

/// Variable names handed out to states, `S` is reserved for the start state
const LETTERS: &str = "ABCDEFGHIJKLMNOPQRTUVWXYZ";

/// `A`..`Z` without `S`, then `A1`..`Z1`, `A2`..
fn variable_name(index: usize) -> String {
    let letters = LETTERS.as_bytes();
    let letter = char::from(letters[index % letters.len()]);
    match index / letters.len() {
        0 => letter.to_string(),
        round => format!("{letter}{round}"),
    }
}

/// Assigns variables to state ids on first use
struct Naming<'a> {
    names: HashMap<&'a str, String>,
    order: Vec<String>,
    next: usize,
}

impl<'a> Naming<'a> {
    fn new(start: Option<&'a State>) -> Self {
        let mut naming = Self {
            names: HashMap::new(),
            order: Vec::new(),
            next: 0,
        };
        if let Some(state) = start {
            naming.names.insert(state.id.as_str(), "S".to_string());
            naming.order.push("S".to_string());
        }
        naming
    }

    fn variable(&mut self, state_id: &'a str) -> String {
        if let Some(name) = self.names.get(state_id) {
            return name.clone();
        }
        let name = variable_name(self.next);
        self.next += 1;
        self.names.insert(state_id, name.clone());
        self.order.push(name.clone());
        name
    }
}

/// Productions keyed by variable in first-use order, alternatives deduplicated
#[derive(Default)]
struct Productions {
    rules: Vec<(String, Vec<Vec<String>>)>,
    weights: Vec<Vec<f64>>,
}

impl Productions {
    fn add(&mut self, variable: &str, alternative: Vec<String>, weight: f64) {
        let index = match self.rules.iter().position(|(v, _)| v == variable) {
            Some(index) => index,
            None => {
                self.rules.push((variable.to_string(), Vec::new()));
                self.weights.push(Vec::new());
                self.rules.len() - 1
            }
        };
        let (_, alternatives) = &mut self.rules[index];
        match alternatives.iter().position(|alt| *alt == alternative) {
            Some(existing) => self.weights[index][existing] += weight,
            None => {
                alternatives.push(alternative);
                self.weights[index].push(weight);
            }
        }
    }

    fn alternatives_of(&self, variable: &str) -> Vec<Vec<String>> {
        self.rules
            .iter()
            .find(|(v, _)| v == variable)
            .map(|(_, alts)| alts.clone())
            .unwrap_or_default()
    }

    fn into_grammar(
        self,
        naming: Naming<'_>,
        terminals: Vec<String>,
    ) -> (Grammar, BTreeMap<String, Vec<f64>>) {
        let start_variable = naming
            .order
            .first()
            .cloned()
            .unwrap_or_else(|| "S".to_string());
        let probabilities = self
            .rules
            .iter()
            .map(|(v, _)| v.clone())
            .zip(self.weights)
            .collect();
        let mut grammar = Grammar {
            variables: naming.order,
            terminals,
            start_variable,
            productions: self
                .rules
                .into_iter()
                .map(|(variable, alternatives)| Production {
                    variable,
                    alternatives,
                })
                .collect(),
        };
        grammar.sort_productions();
        (grammar, probabilities)
    }
}

/// Initial states first, then the rest, each group in document order
fn visit_order(chain: &MarkovChain) -> impl Iterator<Item = &State> {
    chain
        .states
        .iter()
        .filter(|s| s.is_initial)
        .chain(chain.states.iter().filter(|s| !s.is_initial))
}

/// Right-linear grammar for the language a labeled chain accepts.
///
/// Only single-character labels become terminals, matching the automaton
/// alphabet. Extra initial states keep their own variable and their
/// alternatives are also offered by `S`.
pub fn chain_to_regular_grammar(chain: &MarkovChain) -> Grammar {
    let initial = chain.initial_states();
    let mut naming = Naming::new(initial.first().copied());
    let mut productions = Productions::default();
    let mut terminals = BTreeSet::new();

    for state in visit_order(chain) {
        let variable = naming.variable(&state.id);

        for transition in chain.outgoing(&state.id) {
            let Some(symbol) = transition.symbol().filter(|s| s.chars().count() == 1) else {
                continue;
            };
            let Some(target) = chain.state(&transition.to) else {
                continue;
            };
            terminals.insert(symbol.to_string());

            let to = naming.variable(&target.id);
            productions.add(&variable, vec![symbol.to_string(), to], 1.0);
        }

        if state.is_final {
            productions.add(&variable, Vec::new(), 1.0);
        }
    }

    for &extra in initial.iter().skip(1) {
        let variable = naming.variable(&extra.id);
        for alternative in productions.alternatives_of(&variable) {
            productions.add("S", alternative, 1.0);
        }
    }

    let (grammar, _) = productions.into_grammar(naming, terminals.into_iter().collect());
    tracing::debug!(
        "Chain with {} states read as a grammar with {} productions",
        chain.states.len(),
        grammar.productions.len()
    );
    grammar
}

/// A grammar whose alternatives carry the probability of the move they came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilisticGrammar {
    #[serde(flatten)]
    pub grammar: Grammar,
    /// Per variable, one weight per alternative in the same order
    pub probabilities: BTreeMap<String, Vec<f64>>,
}

/// Grammar over state names that keeps the transition probabilities.
///
/// `A → sunny B` carries the probability of the move from `A` to the state
/// named `Sunny`, parallel moves add up. A final state without moves gets
/// `ε` with weight 1. Only the first initial state becomes `S`.
pub fn chain_to_probabilistic_grammar(chain: &MarkovChain) -> ProbabilisticGrammar {
    let mut naming = Naming::new(chain.initial_states().first().copied());
    let mut productions = Productions::default();
    let mut terminals = Vec::new();
    for state in &chain.states {
        let terminal = state.display_name().to_lowercase();
        if !terminals.contains(&terminal) {
            terminals.push(terminal);
        }
    }

    for state in visit_order(chain) {
        let variable = naming.variable(&state.id);
        let mut has_moves = false;

        for transition in chain.outgoing(&state.id) {
            let Some(target) = chain.state(&transition.to) else {
                continue;
            };
            has_moves = true;
            let to = naming.variable(&target.id);
            productions.add(
                &variable,
                vec![target.display_name().to_lowercase(), to],
                transition.probability,
            );
        }

        if state.is_final && !has_moves {
            productions.add(&variable, Vec::new(), 1.0);
        }
    }

    let (grammar, probabilities) = productions.into_grammar(naming, terminals);
    ProbabilisticGrammar {
        grammar,
        probabilities,
    }
}

/// Alternatives that are neither `a..a` nor `a..aB`
fn non_right_linear(grammar: &Grammar) -> Vec<String> {
    let mut offending = Vec::new();
    for production in &grammar.productions {
        for alternative in &production.alternatives {
            let Some(last) = alternative.last() else {
                continue;
            };
            let variables = alternative.iter().filter(|s| grammar.is_variable(s)).count();
            if variables > 1 || (variables == 1 && !grammar.is_variable(last)) {
                offending.push(format!(
                    "{} → {}",
                    production.variable,
                    grammar.render_alternative(alternative)
                ));
            }
        }
    }
    offending
}

/// `variable` followed by every variable it reaches through unit rules `A → B`
fn unit_closure<'a>(grammar: &'a Grammar, variable: &'a str) -> Vec<&'a str> {
    let mut seen: HashSet<&str> = HashSet::from([variable]);
    let mut order = vec![variable];
    let mut queue = VecDeque::from([variable]);

    while let Some(current) = queue.pop_front() {
        for alternative in grammar.alternatives(current) {
            if let [only] = alternative
                && grammar.is_variable(only)
                && seen.insert(only.as_str())
            {
                order.push(only.as_str());
                queue.push_back(only.as_str());
            }
        }
    }

    order
}

/// Build a labeled chain accepting the language of a right-linear grammar.
///
/// Each variable becomes a state named after it, the start variable is the
/// initial state and a variable is accepting when it derives `ε`. Unit
/// rules are folded in, `A → abB` goes through a fresh intermediate state
/// per extra terminal and terminal-only alternatives end in the shared
/// [`ACCEPT_STATE_ID`] state. Each state's moves get equal probability.
pub fn grammar_to_chain(grammar: &Grammar) -> Result<MarkovChain> {
    let validation = validate_grammar(grammar);
    if !validation.is_valid() {
        return Err(Error::validation(validation.errors.join("; ")));
    }

    let offending = non_right_linear(grammar);
    if !offending.is_empty() {
        let mut listed = offending.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
        if offending.len() > 3 {
            listed.push_str(", ...");
        }
        return Err(Error::NotRightLinear(listed));
    }

    let mut states: Vec<State> = Vec::new();
    for variable in &grammar.variables {
        let derives_empty = unit_closure(grammar, variable)
            .into_iter()
            .any(|v| grammar.alternatives(v).any(|alt| alt.is_empty()));
        let mut state = State::new(variable.as_str(), variable.as_str());
        state.is_initial = *variable == grammar.start_variable;
        state.is_final = derives_empty;
        states.push(state);
    }

    let mut moves: Vec<(String, String, String)> = Vec::new();
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let mut needs_accept = false;
    let mut fresh = 0;

    for variable in &grammar.variables {
        for source in unit_closure(grammar, variable) {
            for alternative in grammar.alternatives(source) {
                let (terminals, target) = match alternative.split_last() {
                    None => continue,
                    Some((last, rest)) if grammar.is_variable(last) => (rest, Some(last)),
                    Some(_) => (alternative, None),
                };
                if terminals.is_empty() {
                    // Unit rule, already folded in by the closure
                    continue;
                }

                let mut from = variable.clone();
                for (i, terminal) in terminals.iter().enumerate() {
                    let to = if i + 1 < terminals.len() {
                        fresh += 1;
                        let id = format!("{variable}.{fresh}");
                        states.push(State::new(id.as_str(), id.as_str()));
                        id
                    } else if let Some(target) = target {
                        target.clone()
                    } else {
                        needs_accept = true;
                        ACCEPT_STATE_ID.to_string()
                    };
                    let step = (from, terminal.clone(), to.clone());
                    if seen.insert(step.clone()) {
                        moves.push(step);
                    }
                    from = to;
                }
            }
        }
    }

    if needs_accept {
        states.push(State::new(ACCEPT_STATE_ID, ACCEPT_STATE_ID).accepting());
    }

    let mut out_degree: HashMap<&str, usize> = HashMap::new();
    for (from, _, _) in &moves {
        *out_degree.entry(from.as_str()).or_default() += 1;
    }
    let transitions: Vec<Transition> = moves
        .iter()
        .enumerate()
        .map(|(i, (from, label, to))| {
            let share = 1.0 / out_degree.get(from.as_str()).copied().unwrap_or(1) as f64;
            Transition::new(format!("t{}", i + 1), from.as_str(), to.as_str(), share)
                .with_label(label.as_str())
        })
        .collect();

    tracing::debug!(
        "Grammar converted to a chain with {} states and {} transitions",
        states.len(),
        transitions.len()
    );
    Ok(MarkovChain::new(states, transitions))
}

//! Automaton view of a labeled chain
//!
//! Only transitions with a non-empty label take part. Probabilities are
//! ignored here.

use crate::chain::{MarkovChain, State, Transition};
use crate::generation::RandomSource;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Longest word explored when searching for accepted examples
pub const MAX_EXAMPLE_LENGTH: usize = 20;

/// Random words tried when searching for rejected examples
pub const MAX_REJECTION_TRIALS: usize = 100;

/// Longest random word tried
pub const MAX_TRIAL_LENGTH: usize = 10;

/// Borrowed automaton over a chain
#[derive(Debug, Clone, Copy)]
pub struct Automaton<'a> {
    chain: &'a MarkovChain,
}

impl<'a> Automaton<'a> {
    /// `None` unless some transition carries a label
    pub fn new(chain: &'a MarkovChain) -> Option<Self> {
        chain.is_labeled().then_some(Self { chain })
    }

    pub fn chain(&self) -> &'a MarkovChain {
        self.chain
    }

    /// Sorted single-character labels.
    ///
    /// A character is one Unicode scalar value, so a label such as `"é"` or
    /// an emoji outside the Basic Multilingual Plane is a symbol, while a
    /// multi-scalar grapheme such as `"e\u{301}"` is not. Longer labels are
    /// still followed as edges elsewhere, they just never become alphabet
    /// symbols.
    pub fn alphabet(&self) -> Vec<String> {
        self.chain
            .transitions
            .iter()
            .filter_map(Transition::symbol)
            .filter(|l| l.chars().count() == 1)
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn initial_states(&self) -> Vec<&'a State> {
        self.chain.initial_states()
    }

    pub fn final_states(&self) -> Vec<&'a State> {
        self.chain.final_states()
    }

    pub fn is_final(&self, state_id: &str) -> bool {
        self.chain.state(state_id).is_some_and(|s| s.is_final)
    }

    /// Labeled transitions leaving `state_id`
    pub fn edges(&self, state_id: &'a str) -> impl Iterator<Item = &'a Transition> + 'a {
        self.chain
            .outgoing(state_id)
            .filter(|t| t.symbol().is_some())
    }

    /// Distinct labels leaving `state_id`
    pub fn labels_from(&self, state_id: &'a str) -> HashSet<&'a str> {
        self.edges(state_id).filter_map(Transition::symbol).collect()
    }

    /// Run `word` from the first initial state.
    ///
    /// Each character follows the first transition (in document order) with
    /// that exact label. A missing transition rejects.
    pub fn accepts(&self, word: &str) -> bool {
        let Some(start) = self.chain.initial_states().first().copied() else {
            return false;
        };

        let mut current = start.id.as_str();
        let mut buf = [0u8; 4];
        for c in word.chars() {
            let symbol: &str = c.encode_utf8(&mut buf);
            match self
                .chain
                .outgoing(current)
                .find(|t| t.label.as_deref() == Some(symbol))
            {
                Some(transition) => current = transition.to.as_str(),
                None => return false,
            }
        }

        self.is_final(current)
    }

    /// Breadth-first search for up to `count` accepted words, shortest first.
    ///
    /// The search does not continue past a final state, so only words whose
    /// first visit to a final state is at their end are produced.
    pub fn accepted_examples(&self, count: usize) -> Vec<String> {
        let initial = self.initial_states();
        if initial.is_empty() || self.final_states().is_empty() {
            return Vec::new();
        }

        let mut examples = Vec::new();
        let mut visited: HashSet<(&str, String)> = HashSet::new();
        let mut queue: VecDeque<(&str, Vec<&str>)> =
            initial.iter().map(|s| (s.id.as_str(), Vec::new())).collect();

        while examples.len() < count {
            let Some((state_id, path)) = queue.pop_front() else {
                break;
            };
            let word = path.concat();
            if !visited.insert((state_id, word.clone())) {
                continue;
            }

            if !path.is_empty() && self.is_final(state_id) {
                examples.push(word);
                continue;
            }

            if path.len() < MAX_EXAMPLE_LENGTH {
                for edge in self.edges(state_id) {
                    if let Some(label) = edge.symbol() {
                        let mut next = path.clone();
                        next.push(label);
                        queue.push_back((edge.to.as_str(), next));
                    }
                }
            }
        }

        examples
    }

    /// Up to `count` distinct random words over the alphabet that the
    /// automaton rejects, drawn from at most [`MAX_REJECTION_TRIALS`] trials
    pub fn rejected_examples(&self, count: usize, rng: &mut impl RandomSource) -> Vec<String> {
        let alphabet = self.alphabet();
        if alphabet.is_empty() {
            return Vec::new();
        }

        let mut examples: Vec<String> = Vec::new();
        let mut trials = 0;
        while examples.len() < count && trials < MAX_REJECTION_TRIALS {
            trials += 1;
            let length = rng.next_index(MAX_TRIAL_LENGTH) + 1;
            let word: String = (0..length)
                .map(|_| alphabet[rng.next_index(alphabet.len())].as_str())
                .collect();

            if !self.accepts(&word) && !examples.contains(&word) {
                examples.push(word);
            }
        }

        examples
    }
}

//! Random walks over a chain
//!
//! The walk follows the chain's own transitions (not the aggregated matrix),
//! sampling each step by roulette-wheel selection over the outgoing
//! transitions of the current state.

use crate::chain::{MarkovChain, StateId, Transition};
use crate::generation::rng::{LcgRng, RandomSource};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// How the next transition is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    #[default]
    Probabilistic,
    /// Label-driven stepping. There is no input symbol stream to drive it,
    /// so it currently samples exactly like [`GenerationMode::Probabilistic`].
    Deterministic,
}

/// Walk parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Requested number of visited states, start included
    pub length: usize,
    #[serde(default)]
    pub start_state_id: Option<StateId>,
    #[serde(default)]
    pub mode: GenerationMode,
    /// Clock-seeded when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl GenerationOptions {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            start_state_id: None,
            mode: GenerationMode::default(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_start(mut self, state_id: impl Into<StateId>) -> Self {
        self.start_state_id = Some(state_id.into());
        self
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// One visited state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStep {
    pub state_id: StateId,
    pub state_name: String,
    pub step: usize,
}

/// A successful walk
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Generation {
    /// Names of the visited states
    pub sequence: Vec<String>,
    pub path: Vec<PathStep>,
}

impl Generation {
    fn push(&mut self, state_id: &str, state_name: &str, step: usize) {
        self.sequence.push(state_name.to_string());
        self.path.push(PathStep {
            state_id: state_id.to_string(),
            state_name: state_name.to_string(),
            step,
        });
    }
}

/// Walk outcome with the failure folded into the value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub sequence: Vec<String>,
    pub path: Vec<PathStep>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<Generation>> for GenerationResult {
    fn from(result: Result<Generation>) -> Self {
        match result {
            Ok(generation) => Self {
                sequence: generation.sequence,
                path: generation.path,
                success: true,
                error: None,
            },
            Err(e) => Self {
                sequence: Vec::new(),
                path: Vec::new(),
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Sequence joined into text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextResult {
    pub text: String,
    pub sequence: Vec<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Roulette-wheel selection over the transitions' own probabilities.
///
/// The probabilities need not sum to one; when the draw lands past the
/// cumulative total the last transition is taken.
pub fn sample_transition<'a>(
    transitions: &[&'a Transition],
    rng: &mut impl RandomSource,
) -> Option<&'a Transition> {
    let last = *transitions.last()?;
    let draw = rng.next_f64();
    let mut cumulative = 0.0;

    for &transition in transitions {
        cumulative += transition.probability;
        if draw <= cumulative {
            return Some(transition);
        }
    }

    Some(last)
}

/// Explicit start if given and non-empty, else an initial state (drawn when
/// there are several), else the first state
fn resolve_start<'a>(
    chain: &'a MarkovChain,
    options: &GenerationOptions,
    rng: &mut impl RandomSource,
) -> Result<&'a str> {
    if let Some(start) = options.start_state_id.as_deref().filter(|id| !id.is_empty()) {
        return chain
            .state(start)
            .map(|s| s.id.as_str())
            .ok_or_else(|| Error::StateNotFound(start.to_string()));
    }

    let initial = chain.initial_states();
    let state = match initial.len() {
        0 => chain.states.first().ok_or(Error::EmptyChain)?,
        1 => initial[0],
        n => initial[rng.next_index(n)],
    };
    Ok(state.id.as_str())
}

/// Walk the chain, failing when it has no states or the start state is unknown
pub fn try_generate(chain: &MarkovChain, options: &GenerationOptions) -> Result<Generation> {
    if chain.is_empty() {
        return Err(Error::EmptyChain);
    }

    let mut rng = LcgRng::from_optional(options.seed);
    let mut current = resolve_start(chain, options, &mut rng)?;

    if options.mode == GenerationMode::Deterministic {
        tracing::debug!("Deterministic mode has no input symbols, sampling probabilistically");
    }

    let mut generation = Generation::default();
    if let Some(state) = chain.state(current) {
        generation.push(&state.id, &state.name, 0);
    }

    for step in 1..options.length {
        let outgoing: Vec<&Transition> = chain.outgoing(current).collect();
        let Some(transition) = sample_transition(&outgoing, &mut rng) else {
            tracing::debug!("State {} has no outgoing transitions, stopping", current);
            break;
        };

        let Some(next) = chain.state(&transition.to) else {
            tracing::debug!("Transition {} leads to unknown state", transition.id);
            break;
        };

        current = next.id.as_str();
        generation.push(&next.id, &next.name, step);
    }

    Ok(generation)
}

/// Walk the chain and report failure in the result value
pub fn generate_text(chain: &MarkovChain, options: &GenerationOptions) -> GenerationResult {
    try_generate(chain, options).into()
}

/// Walk the chain and join the visited state names with spaces
pub fn generate_text_string(chain: &MarkovChain, options: &GenerationOptions) -> TextResult {
    let result = generate_text(chain, options);
    TextResult {
        text: result.sequence.join(" "),
        sequence: result.sequence,
        success: result.success,
        error: result.error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::State;

    struct Fixed(Vec<f64>);

    impl RandomSource for Fixed {
        fn next_f64(&mut self) -> f64 {
            self.0.remove(0)
        }
    }

    fn weather() -> MarkovChain {
        MarkovChain::new(
            vec![State::new("s", "Sunny"), State::new("r", "Rainy")],
            vec![
                Transition::new("t1", "s", "s", 0.7),
                Transition::new("t2", "s", "r", 0.3),
                Transition::new("t3", "r", "s", 0.4),
                Transition::new("t4", "r", "r", 0.6),
            ],
        )
    }

    #[test]
    fn test_empty_chain_fails() {
        let result = generate_text(&MarkovChain::default(), &GenerationOptions::new(5));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("No states in chain"));
        assert!(result.sequence.is_empty());
    }

    #[test]
    fn test_unknown_start_fails() {
        let options = GenerationOptions::new(5).with_start("fog").with_seed(1);
        let result = generate_text(&weather(), &options);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Start state fog not found"));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let options = GenerationOptions::new(25).with_seed(1234);
        let first = generate_text(&weather(), &options);
        let second = generate_text(&weather(), &options);
        assert!(first.success);
        assert_eq!(first.sequence.len(), 25);
        assert_eq!(first.sequence, second.sequence);
    }

    #[test]
    fn test_falls_back_to_first_state() {
        let result = generate_text(&weather(), &GenerationOptions::new(1).with_seed(9));
        assert_eq!(result.sequence, vec!["Sunny".to_string()]);
        assert_eq!(result.path[0].step, 0);
    }

    #[test]
    fn test_zero_length_still_emits_start() {
        let result = generate_text(&weather(), &GenerationOptions::new(0).with_seed(9));
        assert!(result.success);
        assert_eq!(result.sequence.len(), 1);
    }

    #[test]
    fn test_single_initial_state_used() {
        let mut chain = weather();
        chain.states[1].is_initial = true;
        let result = generate_text(&chain, &GenerationOptions::new(1).with_seed(5));
        assert_eq!(result.path[0].state_id, "r");
    }

    #[test]
    fn test_empty_start_id_falls_back() {
        let mut chain = weather();
        chain.states[1].is_initial = true;
        let result = generate_text(&chain, &GenerationOptions::new(1).with_start(""));
        assert!(result.success);
        assert_eq!(result.path[0].state_id, "r");
    }

    /// Two initial states, each with a self-loop and an exit to `c`
    fn two_starts() -> MarkovChain {
        MarkovChain::new(
            vec![
                State::new("a", "A").initial(),
                State::new("b", "B").initial(),
                State::new("c", "C"),
            ],
            vec![
                Transition::new("t1", "a", "a", 0.5),
                Transition::new("t2", "a", "c", 0.5),
                Transition::new("t3", "b", "b", 0.5),
                Transition::new("t4", "b", "c", 0.5),
                Transition::new("t5", "c", "a", 0.5),
                Transition::new("t6", "c", "b", 0.5),
            ],
        )
    }

    fn ids(result: &GenerationResult) -> Vec<&str> {
        result.path.iter().map(|p| p.state_id.as_str()).collect()
    }

    #[test]
    fn test_start_drawn_among_initial_states() {
        let chain = two_starts();

        let picked = resolve_start(&chain, &GenerationOptions::new(1), &mut Fixed(vec![0.2]));
        assert_eq!(picked.unwrap(), "a");
        let picked = resolve_start(&chain, &GenerationOptions::new(1), &mut Fixed(vec![0.75]));
        assert_eq!(picked.unwrap(), "b");

        // Seed 1 draws 0.2512 then 0.5453, seed 42 draws 0.8859 then 0.8176
        let first = generate_text(&chain, &GenerationOptions::new(1).with_seed(1));
        let again = generate_text(&chain, &GenerationOptions::new(1).with_seed(1));
        let other = generate_text(&chain, &GenerationOptions::new(1).with_seed(42));
        assert_eq!(ids(&first), vec!["a"]);
        assert_eq!(ids(&again), vec!["a"]);
        assert_eq!(ids(&other), vec!["b"]);
    }

    #[test]
    fn test_start_draw_precedes_first_step() {
        let chain = two_starts();

        // The first draw picks the start, the second picks the first step
        let result = generate_text(&chain, &GenerationOptions::new(3).with_seed(1));
        assert_eq!(ids(&result), vec!["a", "c", "a"]);

        let result = generate_text(&chain, &GenerationOptions::new(3).with_seed(42));
        assert_eq!(ids(&result), vec!["b", "c", "b"]);

        let mut rng = LcgRng::new(1);
        let start = ["a", "b"][rng.next_index(2)];
        let step = sample_transition(&chain.outgoing(start).collect::<Vec<_>>(), &mut rng);
        assert_eq!(step.map(|t| t.to.as_str()), Some("c"));
    }

    #[test]
    fn test_dead_end_stops_early() {
        let chain = MarkovChain::new(
            vec![State::new("a", "A"), State::new("b", "B")],
            vec![Transition::new("t1", "a", "b", 1.0)],
        );
        let result = generate_text(&chain, &GenerationOptions::new(10).with_seed(3));
        assert!(result.success);
        assert_eq!(result.sequence, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(result.path[1].step, 1);
    }

    #[test]
    fn test_deterministic_mode_matches_probabilistic() {
        let probabilistic = GenerationOptions::new(15).with_seed(77);
        let deterministic = probabilistic
            .clone()
            .with_mode(GenerationMode::Deterministic);
        assert_eq!(
            generate_text(&weather(), &probabilistic).sequence,
            generate_text(&weather(), &deterministic).sequence
        );
    }

    #[test]
    fn test_roulette_selection() {
        let t1 = Transition::new("t1", "a", "a", 0.2);
        let t2 = Transition::new("t2", "a", "b", 0.5);
        let candidates = vec![&t1, &t2];

        let picked = sample_transition(&candidates, &mut Fixed(vec![0.1]));
        assert_eq!(picked.map(|t| t.id.as_str()), Some("t1"));

        let picked = sample_transition(&candidates, &mut Fixed(vec![0.6]));
        assert_eq!(picked.map(|t| t.id.as_str()), Some("t2"));

        // Past the cumulative total of 0.7
        let picked = sample_transition(&candidates, &mut Fixed(vec![0.9]));
        assert_eq!(picked.map(|t| t.id.as_str()), Some("t2"));

        assert!(sample_transition(&[], &mut Fixed(vec![0.5])).is_none());
    }

    #[test]
    fn test_text_string_joins_names() {
        let chain = MarkovChain::new(
            vec![State::new("a", "the"), State::new("b", "end")],
            vec![Transition::new("t1", "a", "b", 1.0)],
        );
        let result = generate_text_string(&chain, &GenerationOptions::new(5).with_seed(1));
        assert!(result.success);
        assert_eq!(result.text, "the end");
    }
}

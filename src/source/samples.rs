//! Built-in sample chains
//!
//! Small chains that show off one property each: an ergodic weather model,
//! a gambler's ruin with absorbing ends, a periodic ring and two labeled
//! automata.

use super::ChainSource;
use crate::chain::{MarkovChain, State, Transition};
use crate::{Error, Result};

/// Catalog entry
pub struct Sample {
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> MarkovChain,
}

impl Sample {
    pub fn chain(&self) -> MarkovChain {
        (self.build)().with_name(self.name)
    }
}

pub const SAMPLES: &[Sample] = &[
    Sample {
        name: "weather",
        description: "Two-state sunny/rainy weather model (ergodic)",
        build: weather,
    },
    Sample {
        name: "gambler",
        description: "Gambler's ruin on $0..$4 with absorbing ends",
        build: gambler,
    },
    Sample {
        name: "cycle",
        description: "Deterministic three-state ring (period 3)",
        build: cycle,
    },
    Sample {
        name: "even-as",
        description: "Automaton over {a, b} accepting words with an even number of a's",
        build: even_as,
    },
    Sample {
        name: "ab-star",
        description: "Single-state automaton accepting (a|b)*",
        build: ab_star,
    },
];

/// Look up a sample by name
pub fn find_sample(name: &str) -> Option<&'static Sample> {
    SAMPLES.iter().find(|s| s.name == name)
}

pub fn sample_names() -> Vec<&'static str> {
    SAMPLES.iter().map(|s| s.name).collect()
}

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

fn gambler() -> MarkovChain {
    let states = (0..=4)
        .map(|i| {
            let state = State::new(format!("g{i}"), format!("${i}"));
            match i {
                2 => state.initial(),
                0 | 4 => state.accepting(),
                _ => state,
            }
        })
        .collect();

    let mut transitions = vec![
        Transition::new("t0", "g0", "g0", 1.0),
        Transition::new("t4", "g4", "g4", 1.0),
    ];
    for i in 1..4 {
        transitions.push(Transition::new(
            format!("t{i}d"),
            format!("g{i}"),
            format!("g{}", i - 1),
            0.5,
        ));
        transitions.push(Transition::new(
            format!("t{i}u"),
            format!("g{i}"),
            format!("g{}", i + 1),
            0.5,
        ));
    }

    MarkovChain::new(states, transitions)
}

fn cycle() -> MarkovChain {
    MarkovChain::new(
        vec![
            State::new("a", "A").initial(),
            State::new("b", "B"),
            State::new("c", "C"),
        ],
        vec![
            Transition::new("t1", "a", "b", 1.0),
            Transition::new("t2", "b", "c", 1.0),
            Transition::new("t3", "c", "a", 1.0),
        ],
    )
}

fn even_as() -> MarkovChain {
    MarkovChain::new(
        vec![
            State::new("even", "Even").initial().accepting(),
            State::new("odd", "Odd"),
        ],
        vec![
            Transition::new("t1", "even", "odd", 0.5).with_label("a"),
            Transition::new("t2", "even", "even", 0.5).with_label("b"),
            Transition::new("t3", "odd", "even", 0.5).with_label("a"),
            Transition::new("t4", "odd", "odd", 0.5).with_label("b"),
        ],
    )
}

fn ab_star() -> MarkovChain {
    MarkovChain::new(
        vec![State::new("q", "Loop").initial().accepting()],
        vec![
            Transition::new("t1", "q", "q", 0.5).with_label("a"),
            Transition::new("t2", "q", "q", 0.5).with_label("b"),
        ],
    )
}

/// Source backed by the built-in catalog
#[derive(Debug, Clone)]
pub struct SampleSource {
    name: &'static str,
}

impl SampleSource {
    pub fn new(name: &str) -> Result<Self> {
        match find_sample(name) {
            Some(sample) => Ok(Self { name: sample.name }),
            None => Err(Error::UnknownSample {
                name: name.to_string(),
                available: sample_names().join(", "),
            }),
        }
    }
}

impl ChainSource for SampleSource {
    fn load(&self) -> Result<MarkovChain> {
        find_sample(self.name)
            .map(Sample::chain)
            .ok_or_else(|| Error::custom(format!("sample '{}' disappeared", self.name)))
    }

    fn describe(&self) -> String {
        format!("sample '{}'", self.name)
    }
}

//! Edge-list chain format
//!
//! ```text
//! # weather model
//! state s "Sunny" initial
//! state r "Rainy"
//! s -> s : 0.7
//! s -> r : 0.3 [x]
//! r -> s : 0.4
//! r -> r : 0.6
//! ```
//!
//! Probabilities default to 1. States referenced before (or without) a
//! `state` line are created in order of first appearance, named after their
//! id. Transition ids are assigned `t1`, `t2`, ... in line order.

use crate::chain::{MarkovChain, State, Transition};
use crate::parser::ChainParser;
use crate::{Error, Result};
use regex::Regex;
use std::collections::HashMap;

const STATE_PATTERN: &str =
    r#"^state\s+(?P<id>[^\s"]+)(?:\s+"(?P<name>[^"]*)")?(?P<flags>(?:\s+(?:initial|final))*)\s*$"#;

const TRANSITION_PATTERN: &str = r"^(?P<from>[^\s:\[\]]+)\s*->\s*(?P<to>[^\s:\[\]]+)(?:\s*:\s*(?P<probability>\S+?))?(?:\s*\[(?P<label>[^\]]*)\])?\s*$";

/// Line-oriented parser; both line patterns are compiled once per parser
#[derive(Debug, Clone)]
pub struct EdgeListParser {
    state_re: Regex,
    transition_re: Regex,
}

impl EdgeListParser {
    pub fn new() -> Self {
        Self {
            state_re: Regex::new(STATE_PATTERN).expect("state line pattern is valid"),
            transition_re: Regex::new(TRANSITION_PATTERN)
                .expect("transition line pattern is valid"),
        }
    }
}

impl Default for EdgeListParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates states in first-appearance order
#[derive(Default)]
struct Builder {
    states: Vec<State>,
    index: HashMap<String, usize>,
    transitions: Vec<Transition>,
}

impl Builder {
    fn state_mut(&mut self, id: &str) -> &mut State {
        let next = self.states.len();
        let idx = *self.index.entry(id.to_string()).or_insert(next);
        if idx == next {
            self.states.push(State::new(id, id));
        }
        &mut self.states[idx]
    }

    fn finish(self) -> MarkovChain {
        MarkovChain::new(self.states, self.transitions)
    }
}

impl ChainParser for EdgeListParser {
    fn parse(&self, input: &str) -> Result<MarkovChain> {
        let mut builder = Builder::default();

        for (lineno, raw) in input.lines().enumerate() {
            let line = raw.trim();
            let lineno = lineno + 1;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(caps) = self.state_re.captures(line) {
                let state = builder.state_mut(&caps["id"]);
                if let Some(name) = caps.name("name") {
                    state.name = name.as_str().to_string();
                }
                for flag in caps["flags"].split_whitespace() {
                    match flag {
                        "initial" => state.is_initial = true,
                        _ => state.is_final = true,
                    }
                }
                continue;
            }

            if let Some(caps) = self.transition_re.captures(line) {
                let probability = match caps.name("probability") {
                    Some(p) => p.as_str().parse::<f64>().map_err(|_| {
                        Error::syntax(lineno, format!("invalid probability '{}'", p.as_str()))
                    })?,
                    None => 1.0,
                };

                builder.state_mut(&caps["from"]);
                builder.state_mut(&caps["to"]);

                let id = format!("t{}", builder.transitions.len() + 1);
                let mut transition = Transition::new(id, &caps["from"], &caps["to"], probability);
                if let Some(label) = caps.name("label").map(|m| m.as_str().trim())
                    && !label.is_empty()
                {
                    transition = transition.with_label(label);
                }
                builder.transitions.push(transition);
                continue;
            }

            return Err(Error::syntax(
                lineno,
                format!("expected 'state <id>' or '<from> -> <to>', found '{}'", line),
            ));
        }

        Ok(builder.finish())
    }

    fn format(&self) -> &'static str {
        "edge-list"
    }
}

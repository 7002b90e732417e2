//! Grammars on disk and grammars built from chains, checked through the
//! automaton they convert back into

use markov_learn::Error;
use markov_learn::chain::{MarkovChain, State, Transition};
use markov_learn::grammar::{
    GrammarType, analyze_grammar, chain_to_regular_grammar, grammar_to_chain, parse_grammar,
};
use markov_learn::language::Automaton;
use proptest::prelude::*;
use std::fs;
use tempfile::TempDir;

const EVEN_AS: &str = "\
# words over {a, b} with an even number of a's
S → aA | bS | ε
A → aS | bA
";

fn accepts(chain: &MarkovChain, word: &str) -> bool {
    Automaton::new(chain).is_some_and(|automaton| automaton.accepts(word))
}

#[test]
fn test_grammar_file_to_automaton() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("even.grammar");
    fs::write(&path, EVEN_AS).unwrap();

    let grammar = parse_grammar(&fs::read_to_string(&path).unwrap()).unwrap();
    let analysis = analyze_grammar(&grammar);
    assert_eq!(analysis.grammar_type, GrammarType::Regular);

    let chain = grammar_to_chain(&grammar).unwrap();
    assert!(chain.validate().is_valid());
    assert!(accepts(&chain, "abab"));
    assert!(!accepts(&chain, "bab"));

    // and back again
    let rules: Vec<&str> = EVEN_AS.lines().skip(1).collect();
    assert_eq!(chain_to_regular_grammar(&chain).to_string(), rules.join("\n"));
}

#[test]
fn test_bad_grammar_file_reports_every_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.grammar");
    fs::write(&path, "S → a\nS = b\n\nx → a\n").unwrap();

    let err = parse_grammar(&fs::read_to_string(&path).unwrap()).unwrap_err();
    let Error::Grammar(errors) = &err else {
        panic!("unexpected error: {err:?}");
    };
    let lines: Vec<usize> = errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![2, 4]);
    assert!(err.to_string().contains("line 4, column 1"));
}

/// Deterministic automaton over {a, b} with 1..=4 states, state 0 initial.
///
/// Each state has at most one move per letter. Probabilities are uniform
/// per state; only the labels matter here.
fn labeled_dfa() -> impl Strategy<Value = MarkovChain> {
    (1usize..=4).prop_flat_map(|n| {
        (
            prop::collection::vec(prop::bool::ANY, n),
            prop::collection::vec((prop::option::of(0..n), prop::option::of(0..n)), n),
        )
            .prop_map(move |(finals, moves)| {
                let states = (0..n)
                    .map(|i| {
                        let mut state = State::new(format!("q{i}"), format!("Q{i}"));
                        state.is_initial = i == 0;
                        state.is_final = finals[i];
                        state
                    })
                    .collect();

                let mut transitions = Vec::new();
                for (i, (on_a, on_b)) in moves.iter().enumerate() {
                    let targets: Vec<(&str, usize)> = [("a", *on_a), ("b", *on_b)]
                        .into_iter()
                        .filter_map(|(label, to)| to.map(|to| (label, to)))
                        .collect();
                    let share = 1.0 / targets.len().max(1) as f64;
                    for (label, to) in targets {
                        transitions.push(
                            Transition::new(
                                format!("t{i}{label}"),
                                format!("q{i}"),
                                format!("q{to}"),
                                share,
                            )
                            .with_label(label),
                        );
                    }
                }

                MarkovChain::new(states, transitions)
            })
    })
}

fn word() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just('a'), Just('b')], 0..8)
        .prop_map(|letters| letters.into_iter().collect())
}

proptest! {
    /// Property: chain → grammar → chain accepts exactly the same words
    #[test]
    fn prop_grammar_round_trip_keeps_language(
        chain in labeled_dfa(),
        words in prop::collection::vec(word(), 1..20),
    ) {
        let grammar = chain_to_regular_grammar(&chain);
        prop_assert_eq!(analyze_grammar(&grammar).grammar_type, GrammarType::Regular);

        let rebuilt = grammar_to_chain(&grammar).unwrap();
        for word in &words {
            prop_assert_eq!(
                accepts(&chain, word),
                accepts(&rebuilt, word),
                "disagree on {:?}",
                word
            );
        }
    }

    /// Property: a grammar printed and parsed again is the same grammar
    #[test]
    fn prop_printed_grammar_parses_back(chain in labeled_dfa()) {
        let grammar = chain_to_regular_grammar(&chain);
        prop_assume!(!grammar.productions.is_empty());

        let reparsed = parse_grammar(&grammar.to_string()).unwrap();
        prop_assert_eq!(reparsed.to_string(), grammar.to_string());
    }
}

//! Grammar module - regular grammars and their automata
//!
//! A [`Grammar`] is a list of variables, a list of terminals, a start
//! variable and one [`Production`] per variable. Grammars come from text
//! (`S → aA | ε`) or from a labeled chain, and right-linear grammars convert
//! back into chains the language module can analyze.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod conversion;
pub mod parser;

// Re-export key types
pub use conversion::{
    ProbabilisticGrammar, chain_to_probabilistic_grammar, chain_to_regular_grammar,
    grammar_to_chain,
};
pub use parser::{GrammarSyntaxError, parse_grammar};

/// All alternatives for one variable. An empty alternative is `ε`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub variable: String,
    pub alternatives: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grammar {
    pub variables: Vec<String>,
    pub terminals: Vec<String>,
    pub start_variable: String,
    pub productions: Vec<Production>,
}

impl Grammar {
    pub fn is_variable(&self, symbol: &str) -> bool {
        self.variables.iter().any(|v| v == symbol)
    }

    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.terminals.iter().any(|t| t == symbol)
    }

    /// Alternatives of every production for `variable`, in order
    pub fn alternatives<'a>(&'a self, variable: &'a str) -> impl Iterator<Item = &'a [String]> {
        self.productions
            .iter()
            .filter(move |p| p.variable == variable)
            .flat_map(|p| p.alternatives.iter().map(Vec::as_slice))
    }

    /// Put the start variable's production first, the rest by name
    pub(crate) fn sort_productions(&mut self) {
        let start = self.start_variable.as_str();
        self.productions.sort_by(|a, b| {
            (a.variable != start)
                .cmp(&(b.variable != start))
                .then_with(|| a.variable.cmp(&b.variable))
        });
    }

    /// Render one alternative so that [`parse_grammar`] reads it back
    pub fn render_alternative(&self, alternative: &[String]) -> String {
        if alternative.is_empty() {
            return "ε".to_string();
        }

        let mut out = String::new();
        for (i, symbol) in alternative.iter().enumerate() {
            if i > 0 {
                let prev = &alternative[i - 1];
                let single = symbol.chars().count() == 1;
                let glued = if self.is_variable(prev) {
                    // `A1` followed by `1` would read back as `A11`
                    single
                        && !self.is_variable(symbol)
                        && !symbol.starts_with(|c: char| c.is_ascii_uppercase() || c.is_ascii_digit())
                } else {
                    prev.chars().count() == 1 && (self.is_variable(symbol) || single)
                };
                if !glued {
                    out.push(' ');
                }
            }
            out.push_str(symbol);
        }
        out
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, production) in self.productions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let alternatives: Vec<String> = production
                .alternatives
                .iter()
                .map(|alt| self.render_alternative(alt))
                .collect();
            write!(f, "{} → {}", production.variable, alternatives.join(" | "))?;
        }
        Ok(())
    }
}

/// Structural problems found in a grammar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GrammarValidation {
    pub errors: Vec<String>,
}

impl GrammarValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check that every variable and symbol is declared
pub fn validate_grammar(grammar: &Grammar) -> GrammarValidation {
    let mut errors = Vec::new();

    if !grammar.is_variable(&grammar.start_variable) {
        errors.push(format!(
            "Start variable \"{}\" not found in variables",
            grammar.start_variable
        ));
    }

    for production in &grammar.productions {
        if !grammar.is_variable(&production.variable) {
            errors.push(format!(
                "Production variable \"{}\" not found in variables",
                production.variable
            ));
        }
        for symbol in production.alternatives.iter().flatten() {
            if !grammar.is_variable(symbol) && !grammar.is_terminal(symbol) {
                errors.push(format!(
                    "Symbol \"{}\" in production \"{}\" is neither a variable nor terminal",
                    symbol, production.variable
                ));
            }
        }
    }

    GrammarValidation { errors }
}

/// Every alternative holds at most one variable, first or last.
///
/// Left- and right-linear alternatives may be mixed.
pub fn is_regular_grammar(grammar: &Grammar) -> bool {
    grammar
        .productions
        .iter()
        .flat_map(|p| &p.alternatives)
        .all(|alt| {
            let positions: Vec<usize> = alt
                .iter()
                .enumerate()
                .filter(|(_, s)| grammar.is_variable(s))
                .map(|(i, _)| i)
                .collect();
            match positions.as_slice() {
                [] => true,
                [i] => *i == 0 || *i == alt.len() - 1,
                _ => false,
            }
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrammarType {
    Regular,
    ContextFree,
    Unknown,
}

impl GrammarType {
    pub fn display_name(&self) -> &'static str {
        match self {
            GrammarType::Regular => "regular",
            GrammarType::ContextFree => "context-free",
            GrammarType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarAnalysis {
    #[serde(rename = "type")]
    pub grammar_type: GrammarType,
    /// Set when some variable has more than one alternative. This is the
    /// cheap "has a choice" test, not a proof of ambiguity.
    pub is_ambiguous: bool,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Classify a grammar, reporting validation errors as an unknown type
pub fn analyze_grammar(grammar: &Grammar) -> GrammarAnalysis {
    let validation = validate_grammar(grammar);
    if !validation.is_valid() {
        return GrammarAnalysis {
            grammar_type: GrammarType::Unknown,
            is_ambiguous: false,
            language: "Invalid grammar".to_string(),
            description: Some(validation.errors.join("; ")),
        };
    }

    let is_ambiguous = grammar
        .variables
        .iter()
        .any(|v| grammar.alternatives(v).count() > 1);

    if is_regular_grammar(grammar) {
        GrammarAnalysis {
            grammar_type: GrammarType::Regular,
            is_ambiguous,
            language: "Regular Language".to_string(),
            description: Some("Right-linear or left-linear regular grammar".to_string()),
        }
    } else {
        GrammarAnalysis {
            grammar_type: GrammarType::ContextFree,
            is_ambiguous,
            language: "Context-Free Language".to_string(),
            description: Some(
                "Context-free grammar (may require pushdown automaton)".to_string(),
            ),
        }
    }
}

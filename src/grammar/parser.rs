//! Grammar text format
//!
//! ```text
//! # even number of a's
//! S → aA | bS | ε
//! A → aS | bA
//! ```
//!
//! One rule per line, `→` or `->` between the variable and its
//! alternatives, `|` between alternatives. Variables are an uppercase letter
//! followed by uppercase letters or digits, every other non-blank character
//! is a one-character terminal. `ε`, `epsilon` or an empty alternative is the
//! empty word. The first rule's variable is the start variable and repeated
//! rules for a variable are merged. Blank lines and lines starting with `#`
//! or `//` are skipped.

use crate::grammar::{Grammar, Production};
use crate::{Error, Result};

/// One bad line, positions are 1-based
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}, column {column}: {message}")]
pub struct GrammarSyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Split `S → rest` or `S -> rest` at the first arrow
fn split_arrow(line: &str) -> Option<(&str, &str)> {
    let arrow = line.find('→').map(|i| (i, '→'.len_utf8()));
    let ascii = line.find("->").map(|i| (i, 2));
    let (at, len) = match (arrow, ascii) {
        (Some(a), Some(b)) => a.min(b),
        (a, b) => a.or(b)?,
    };
    Some((&line[..at], &line[at + len..]))
}

fn is_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Break one alternative into variables and single-character terminals
fn tokenize(alternative: &str) -> Vec<String> {
    let mut symbols = Vec::new();
    let mut chars = alternative.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if c.is_ascii_uppercase() {
            let mut variable = c.to_string();
            while let Some(next) = chars.next_if(|n| n.is_ascii_uppercase() || n.is_ascii_digit())
            {
                variable.push(next);
            }
            symbols.push(variable);
        } else {
            symbols.push(c.to_string());
        }
    }

    symbols
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

/// Parse grammar text, collecting every bad line before failing
pub fn parse_grammar(text: &str) -> Result<Grammar> {
    let mut errors = Vec::new();
    let mut grammar = Grammar::default();
    let mut start: Option<String> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        let line_number = index + 1;
        let column = raw.chars().take_while(|c| c.is_whitespace()).count() + 1;

        let rule = split_arrow(line)
            .map(|(lhs, rhs)| (lhs.trim(), rhs.trim()))
            .filter(|(lhs, rhs)| {
                !lhs.is_empty()
                    && !rhs.is_empty()
                    && lhs.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            });
        let Some((variable, alternatives)) = rule else {
            errors.push(GrammarSyntaxError {
                line: line_number,
                column,
                message: "Invalid production rule format. Expected: Variable → alternatives"
                    .to_string(),
            });
            continue;
        };

        if !is_variable_name(variable) {
            errors.push(GrammarSyntaxError {
                line: line_number,
                column,
                message: format!(
                    "Invalid variable name \"{}\". Variables should be uppercase letters (e.g., S, A, B)",
                    variable
                ),
            });
            continue;
        }

        push_unique(&mut grammar.variables, variable);
        start.get_or_insert_with(|| variable.to_string());

        let mut parsed = Vec::new();
        for alternative in alternatives.split('|').map(str::trim) {
            if matches!(alternative, "" | "ε" | "epsilon") {
                parsed.push(Vec::new());
                continue;
            }
            let symbols = tokenize(alternative);
            for symbol in &symbols {
                if is_variable_name(symbol) {
                    push_unique(&mut grammar.variables, symbol);
                } else {
                    push_unique(&mut grammar.terminals, symbol);
                }
            }
            parsed.push(symbols);
        }

        match grammar
            .productions
            .iter_mut()
            .find(|p| p.variable == variable)
        {
            Some(production) => production.alternatives.extend(parsed),
            None => grammar.productions.push(Production {
                variable: variable.to_string(),
                alternatives: parsed,
            }),
        }
    }

    if !errors.is_empty() {
        return Err(Error::Grammar(errors));
    }

    grammar.start_variable = start.unwrap_or_else(|| "S".to_string());
    grammar.sort_productions();
    tracing::debug!(
        "Parsed grammar with {} variables and {} terminals",
        grammar.variables.len(),
        grammar.terminals.len()
    );
    Ok(grammar)
}

//! Output formatting module
//!
//! This module handles formatting analysis reports, generated walks and
//! language analyses for different output formats.

use crate::analysis::ChainReport;
use crate::chain::{ChainGraph, MarkovChain, ValidationReport};
use crate::generation::{GenerationResult, TextResult};
use crate::grammar::{Grammar, GrammarAnalysis};
use crate::language::LanguageAnalysis;
use crate::source::samples::Sample;
use crate::{Result, cli::OutputFormat};
use serde_json::json;
use std::collections::BTreeMap;

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn write_pretty(w: &mut impl std::io::Write, value: &impl serde::Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)?; // Add trailing newline
    Ok(())
}

/// Output a chain report as JSON
pub fn output_report_json(w: &mut impl std::io::Write, report: &ChainReport) -> Result<()> {
    write_pretty(w, report)
}

/// Output a chain report as text tables
pub fn output_report_table(w: &mut impl std::io::Write, report: &ChainReport) -> Result<()> {
    let convergence = &report.convergence;
    let properties = &convergence.chain_properties;

    writeln!(
        w,
        "Markov Chain Analysis{}",
        report
            .name
            .as_ref()
            .map(|n| format!(" - {}", n))
            .unwrap_or_default()
    )?;
    writeln!(w, "{}", "=".repeat(60))?;
    writeln!(w)?;

    if report.state_ids.is_empty() {
        writeln!(w, "Chain has no states.")?;
        return Ok(());
    }

    let width = report
        .state_ids
        .iter()
        .map(|id| id.chars().count())
        .max()
        .unwrap_or(0)
        .max(8);

    writeln!(w, "Transition Matrix:")?;
    write!(w, "  {:<width$}", "")?;
    for id in &report.state_ids {
        write!(w, " {:>width$}", id)?;
    }
    writeln!(w)?;
    for (id, row) in report.state_ids.iter().zip(report.matrix.as_rows()) {
        write!(w, "  {:<width$}", id)?;
        for p in row {
            write!(w, " {:>width$.4}", p)?;
        }
        writeln!(w)?;
    }
    writeln!(w)?;

    writeln!(w, "Stationary Distribution:")?;
    writeln!(w, "{:-<60}", "")?;
    for (id, p) in report.distribution() {
        writeln!(w, "  {:<width$} {:>10.6}", id, p)?;
    }
    writeln!(w)?;

    writeln!(w, "Convergence:")?;
    writeln!(w, "  Converged:        {}", yes_no(convergence.converged))?;
    writeln!(w, "  Iterations:       {}", convergence.iterations)?;
    match convergence.convergence_rate {
        Some(rate) => writeln!(w, "  Convergence Rate: {:.6}", rate)?,
        None => writeln!(w, "  Convergence Rate: n/a")?,
    }
    writeln!(w)?;

    writeln!(w, "Properties:")?;
    writeln!(w, "  Ergodic:          {}", yes_no(properties.is_ergodic))?;
    writeln!(w, "  Irreducible:      {}", yes_no(properties.is_irreducible))?;
    writeln!(w, "  Aperiodic:        {}", yes_no(properties.is_aperiodic))?;
    writeln!(
        w,
        "  Absorbing States: {}",
        if properties.absorbing_states.is_empty() {
            "none".to_string()
        } else {
            properties.absorbing_states.join(", ")
        }
    )?;
    writeln!(
        w,
        "  Communicating Classes: {}",
        properties.communicating_classes.len()
    )?;
    for class in &properties.communicating_classes {
        writeln!(w, "    {{{}}}", class.join(", "))?;
    }

    Ok(())
}

/// Output a chain as a Graphviz digraph
pub fn output_dot(w: &mut impl std::io::Write, graph: &ChainGraph) -> Result<()> {
    write!(w, "{}", graph.to_dot())?;
    Ok(())
}

/// Output a generated walk as JSON
pub fn output_generation_json(w: &mut impl std::io::Write, result: &GenerationResult) -> Result<()> {
    write_pretty(w, result)
}

/// Output a generated walk as a step table
pub fn output_generation_table(
    w: &mut impl std::io::Write,
    result: &GenerationResult,
) -> Result<()> {
    if let Some(error) = &result.error {
        writeln!(w, "Generation failed: {}", error)?;
        return Ok(());
    }

    writeln!(w, "Generated Sequence ({} states):", result.sequence.len())?;
    writeln!(w, "{:-<60}", "")?;
    writeln!(w, "{:>6}  {:<20} {:<30}", "Step", "State", "Name")?;
    writeln!(w, "{:-<60}", "")?;
    for step in &result.path {
        writeln!(
            w,
            "{:>6}  {:<20} {:<30}",
            step.step, step.state_id, step.state_name
        )?;
    }
    writeln!(w)?;
    writeln!(w, "Text: {}", result.sequence.join(" "))?;

    Ok(())
}

/// Output a joined walk, either as JSON or as the bare text line
pub fn output_text(
    w: &mut impl std::io::Write,
    result: &TextResult,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_pretty(w, result),
        _ => {
            if result.success {
                writeln!(w, "{}", result.text)?;
            }
            Ok(())
        }
    }
}

/// Output a language analysis and word checks as JSON
pub fn output_language_json(
    w: &mut impl std::io::Write,
    analysis: &LanguageAnalysis,
    checks: &[(String, bool)],
) -> Result<()> {
    let mut output = serde_json::to_value(analysis)?;
    if !checks.is_empty()
        && let Some(object) = output.as_object_mut()
    {
        object.insert(
            "checks".to_string(),
            checks
                .iter()
                .map(|(word, accepted)| json!({ "word": word, "accepted": accepted }))
                .collect(),
        );
    }
    write_pretty(w, &output)
}

/// Output a language analysis and word checks as text
pub fn output_language_table(
    w: &mut impl std::io::Write,
    analysis: &LanguageAnalysis,
    checks: &[(String, bool)],
) -> Result<()> {
    let properties = &analysis.properties;

    writeln!(w, "Language Analysis")?;
    writeln!(w, "{}", "=".repeat(60))?;
    writeln!(w)?;
    writeln!(w, "  Type:        {}", analysis.language_type.display_name())?;
    if let Some(description) = &analysis.description {
        writeln!(w, "  Description: {}", description)?;
    }
    if let Some(regex) = &analysis.regular_expression {
        writeln!(w, "  Expression:  {}", regex)?;
    }
    writeln!(w, "  Alphabet:    {{{}}}", properties.alphabet.join(", "))?;
    writeln!(w, "  Empty:       {}", yes_no(properties.is_empty))?;
    writeln!(w, "  Finite:      {}", yes_no(properties.is_finite))?;
    writeln!(w, "  Universal:   {}", yes_no(properties.is_universal))?;
    writeln!(w)?;

    writeln!(w, "Accepted Examples:")?;
    if analysis.accepted_examples.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for word in &analysis.accepted_examples {
        writeln!(w, "  {}", word)?;
    }
    writeln!(w)?;

    writeln!(w, "Rejected Examples:")?;
    if analysis.rejected_examples.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for word in &analysis.rejected_examples {
        writeln!(w, "  {}", word)?;
    }

    if !checks.is_empty() {
        writeln!(w)?;
        writeln!(w, "Word Checks:")?;
        for (word, accepted) in checks {
            let word = if word.is_empty() { "ε" } else { word.as_str() };
            writeln!(
                w,
                "  {:<20} {}",
                word,
                if *accepted { "accepted" } else { "rejected" }
            )?;
        }
    }

    Ok(())
}

/// Output a grammar and its analysis as JSON
pub fn output_grammar_json(
    w: &mut impl std::io::Write,
    grammar: &impl serde::Serialize,
    analysis: &GrammarAnalysis,
) -> Result<()> {
    let output = json!({
        "grammar": serde_json::to_value(grammar)?,
        "analysis": serde_json::to_value(analysis)?,
    });
    write_pretty(w, &output)
}

/// Output a grammar, optionally with alternative weights, and its analysis
pub fn output_grammar_table(
    w: &mut impl std::io::Write,
    grammar: &Grammar,
    probabilities: Option<&BTreeMap<String, Vec<f64>>>,
    analysis: &GrammarAnalysis,
) -> Result<()> {
    writeln!(w, "Grammar Analysis")?;
    writeln!(w, "{}", "=".repeat(60))?;
    writeln!(w)?;
    writeln!(w, "  Type:        {}", analysis.grammar_type.display_name())?;
    writeln!(w, "  Language:    {}", analysis.language)?;
    if let Some(description) = &analysis.description {
        writeln!(w, "  Description: {}", description)?;
    }
    writeln!(w, "  Ambiguous:   {}", yes_no(analysis.is_ambiguous))?;
    writeln!(w, "  Start:       {}", grammar.start_variable)?;
    writeln!(w, "  Variables:   {{{}}}", grammar.variables.join(", "))?;
    writeln!(w, "  Terminals:   {{{}}}", grammar.terminals.join(", "))?;
    writeln!(w)?;

    writeln!(w, "Productions:")?;
    if grammar.productions.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for production in &grammar.productions {
        let weights = probabilities.and_then(|p| p.get(&production.variable));
        let alternatives: Vec<String> = production
            .alternatives
            .iter()
            .enumerate()
            .map(|(i, alt)| {
                let text = grammar.render_alternative(alt);
                match weights.and_then(|ws| ws.get(i)) {
                    Some(weight) => format!("{} [{:.3}]", text, weight),
                    None => text,
                }
            })
            .collect();
        writeln!(w, "  {} → {}", production.variable, alternatives.join(" | "))?;
    }

    Ok(())
}

/// Output a chain document as JSON
pub fn output_chain_json(w: &mut impl std::io::Write, chain: &MarkovChain) -> Result<()> {
    write_pretty(w, chain)
}

/// Output the states and labeled moves of a chain
pub fn output_chain_table(w: &mut impl std::io::Write, chain: &MarkovChain) -> Result<()> {
    writeln!(w, "Automaton ({} states):", chain.states.len())?;
    writeln!(w, "{:-<60}", "")?;
    for state in &chain.states {
        let mut flags = Vec::new();
        if state.is_initial {
            flags.push("initial");
        }
        if state.is_final {
            flags.push("final");
        }
        writeln!(w, "  {:<12} {}", state.id, flags.join(", "))?;
    }
    writeln!(w)?;

    writeln!(w, "Transitions:")?;
    for transition in &chain.transitions {
        writeln!(
            w,
            "  {} --{}--> {}  ({:.3})",
            transition.from,
            transition.symbol().unwrap_or("ε"),
            transition.to,
            transition.probability
        )?;
    }

    Ok(())
}

/// Output a validation report
pub fn output_validation(
    w: &mut impl std::io::Write,
    chain: &MarkovChain,
    report: &ValidationReport,
) -> Result<()> {
    writeln!(w, "Chain Validation Report")?;
    writeln!(w, "{}", "=".repeat(60))?;
    if let Some(name) = &chain.name {
        writeln!(w, "Chain: {}", name)?;
    }
    writeln!(w, "  States:      {}", chain.states.len())?;
    writeln!(w, "  Transitions: {}", chain.transitions.len())?;
    writeln!(w, "  Labeled:     {}", yes_no(chain.is_labeled()))?;
    writeln!(w)?;

    if !report.errors.is_empty() {
        writeln!(w, "Errors:")?;
        for error in &report.errors {
            writeln!(w, "  {}", error)?;
        }
        writeln!(w)?;
    }

    if !report.warnings.is_empty() {
        writeln!(w, "Warnings:")?;
        for warning in &report.warnings {
            writeln!(w, "  {}", warning)?;
        }
        writeln!(w)?;
    }

    if report.is_valid() {
        writeln!(w, "Chain is valid.")?;
    } else {
        writeln!(
            w,
            "Chain validation failed with {} error(s)",
            report.errors.len()
        )?;
    }

    Ok(())
}

/// Output the sample catalog
pub fn output_samples(w: &mut impl std::io::Write, samples: &[Sample]) -> Result<()> {
    writeln!(w, "Built-in sample chains (use with --source sample):")?;
    for sample in samples {
        writeln!(w, "  {:<10} {}", sample.name, sample.description)?;
    }
    Ok(())
}

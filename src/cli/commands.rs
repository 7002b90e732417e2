//! CLI command implementations
//!
//! This module contains the implementation for each CLI command.

use crate::cli::{Cli, Commands, OutputFormat, SourceType};
use crate::source::load_chain;
use crate::{Config, Error, Result};
use std::io::Write;

/// Analyze command implementation
pub mod analyze {
    use super::*;
    use crate::analysis::analyze_chain;
    use crate::chain::ChainGraph;

    /// Execute the analyze command
    pub fn execute(args: Cli, config: &Config) -> Result<()> {
        let (input, source, tolerance, max_iterations, output) = match args.command {
            Commands::Analyze {
                input,
                source,
                tolerance,
                max_iterations,
                output,
            } => (input, source, tolerance, max_iterations, output),
            _ => unreachable!("analyze::execute called with wrong command"),
        };

        let output_format = OutputFormat::resolve(output, config)?;
        let mut options = config.stationary_options();
        if let Some(tolerance) = tolerance {
            options.tolerance = tolerance;
        }
        if let Some(max_iterations) = max_iterations {
            options.max_iterations = max_iterations;
        }

        let chain = load_chain(source, &input)?;
        let report = chain.validate();
        for warning in &report.warnings {
            tracing::warn!("{}", warning);
        }
        for error in &report.errors {
            tracing::warn!("{}", error);
        }

        tracing::info!(
            "Running power iteration (tolerance {:e}, at most {} iterations)",
            options.tolerance,
            options.max_iterations
        );
        let analysis = analyze_chain(&chain, &options);
        tracing::info!(
            "Power iteration {} after {} iterations",
            if analysis.convergence.converged {
                "converged"
            } else {
                "did not converge"
            },
            analysis.convergence.iterations
        );

        let mut stdout = std::io::stdout();
        match output_format {
            OutputFormat::Json => crate::cli::output::output_report_json(&mut stdout, &analysis)?,
            OutputFormat::Table => {
                crate::cli::output::output_report_table(&mut stdout, &analysis)?
            }
            OutputFormat::Dot => {
                tracing::info!("Building chain graph for DOT output...");
                let graph = ChainGraph::from_chain(&chain);
                tracing::debug!("Graph stats: {:?}", graph.stats());
                crate::cli::output::output_dot(&mut stdout, &graph)?;
            }
        }

        Ok(())
    }
}

/// Generate command implementation
pub mod generate {
    use super::*;
    use crate::generation::{GenerationOptions, generate_text, generate_text_string};

    /// Execute the generate command
    pub fn execute(args: Cli, config: &Config) -> Result<()> {
        let (input, source, length, start, mode, seed, text, output) = match args.command {
            Commands::Generate {
                input,
                source,
                length,
                start,
                mode,
                seed,
                text,
                output,
            } => (input, source, length, start, mode, seed, text, output),
            _ => unreachable!("generate::execute called with wrong command"),
        };

        let output_format = OutputFormat::resolve(output, config)?;
        crate::ensure!(
            output_format != OutputFormat::Dot,
            "DOT output is only available for the analyze command"
        );

        let mut options = GenerationOptions::new(length.unwrap_or(config.generation.length))
            .with_mode(mode.map(Into::into).unwrap_or(config.generation.mode));
        options.seed = match seed {
            Some(seed) => Some(seed),
            None => config.generation_seed()?,
        };
        if let Some(start) = start {
            options = options.with_start(start);
        }
        tracing::debug!("Generation options: {:?}", options);

        let chain = load_chain(source, &input)?;
        let mut stdout = std::io::stdout();

        let error = if text {
            let result = generate_text_string(&chain, &options);
            crate::cli::output::output_text(&mut stdout, &result, output_format)?;
            result.error
        } else {
            let result = generate_text(&chain, &options);
            tracing::info!("Generated {} states", result.sequence.len());
            match output_format {
                OutputFormat::Json => {
                    crate::cli::output::output_generation_json(&mut stdout, &result)?
                }
                _ => crate::cli::output::output_generation_table(&mut stdout, &result)?,
            }
            result.error
        };

        if let Some(message) = error {
            crate::bail!("Generation failed: {}", message);
        }
        Ok(())
    }
}

/// Language command implementation
pub mod language {
    use super::*;
    use crate::language::{Automaton, analyze_language, analyze_language_seeded};

    /// Execute the language command
    pub fn execute(args: Cli, config: &Config) -> Result<()> {
        let (input, source, seed, check, output) = match args.command {
            Commands::Language {
                input,
                source,
                seed,
                check,
                output,
            } => (input, source, seed, check, output),
            _ => unreachable!("language::execute called with wrong command"),
        };

        let output_format = OutputFormat::resolve(output, config)?;
        crate::ensure!(
            output_format != OutputFormat::Dot,
            "DOT output is only available for the analyze command"
        );

        let chain = load_chain(source, &input)?;
        let seed = match seed {
            Some(seed) => Some(seed),
            None => config.generation_seed()?,
        };
        let analysis = match seed {
            Some(seed) => analyze_language_seeded(&chain, seed),
            None => analyze_language(&chain),
        };

        let checks: Vec<(String, bool)> = match Automaton::new(&chain) {
            Some(automaton) => check
                .into_iter()
                .map(|word| {
                    let accepted = automaton.accepts(&word);
                    (word, accepted)
                })
                .collect(),
            None => {
                if !check.is_empty() {
                    tracing::warn!("Chain has no labeled transitions, every word is rejected");
                }
                check.into_iter().map(|word| (word, false)).collect()
            }
        };

        let mut stdout = std::io::stdout();
        match output_format {
            OutputFormat::Json => {
                crate::cli::output::output_language_json(&mut stdout, &analysis, &checks)?
            }
            _ => crate::cli::output::output_language_table(&mut stdout, &analysis, &checks)?,
        }

        Ok(())
    }
}

/// Grammar command implementation
pub mod grammar {
    use super::*;
    use crate::grammar::{analyze_grammar, chain_to_probabilistic_grammar, chain_to_regular_grammar};

    /// Execute the grammar command
    pub fn execute(args: Cli, config: &Config) -> Result<()> {
        let (input, source, probabilistic, output) = match args.command {
            Commands::Grammar {
                input,
                source,
                probabilistic,
                output,
            } => (input, source, probabilistic, output),
            _ => unreachable!("grammar::execute called with wrong command"),
        };

        let output_format = OutputFormat::resolve(output, config)?;
        crate::ensure!(
            output_format != OutputFormat::Dot,
            "DOT output is only available for the analyze and from-grammar commands"
        );

        let chain = load_chain(source, &input)?;
        let mut stdout = std::io::stdout();

        if probabilistic {
            let result = chain_to_probabilistic_grammar(&chain);
            let analysis = analyze_grammar(&result.grammar);
            match output_format {
                OutputFormat::Json => {
                    crate::cli::output::output_grammar_json(&mut stdout, &result, &analysis)?
                }
                _ => crate::cli::output::output_grammar_table(
                    &mut stdout,
                    &result.grammar,
                    Some(&result.probabilities),
                    &analysis,
                )?,
            }
        } else {
            if !chain.is_labeled() {
                tracing::warn!("Chain has no labeled transitions, the grammar has no moves");
            }
            let grammar = chain_to_regular_grammar(&chain);
            let analysis = analyze_grammar(&grammar);
            match output_format {
                OutputFormat::Json => {
                    crate::cli::output::output_grammar_json(&mut stdout, &grammar, &analysis)?
                }
                _ => crate::cli::output::output_grammar_table(
                    &mut stdout,
                    &grammar,
                    None,
                    &analysis,
                )?,
            }
        }

        Ok(())
    }
}

/// From-grammar command implementation
pub mod from_grammar {
    use super::*;
    use crate::chain::ChainGraph;
    use crate::grammar::{analyze_grammar, grammar_to_chain, parse_grammar};
    use std::path::Path;

    /// Execute the from-grammar command
    pub fn execute(file: &Path, output: Option<OutputFormat>, config: &Config) -> Result<()> {
        let output_format = OutputFormat::resolve(output, config)?;

        tracing::info!("Reading grammar from {:?}", file);
        let text = std::fs::read_to_string(file)?;
        let grammar = parse_grammar(&text)?;
        let analysis = analyze_grammar(&grammar);
        tracing::info!(
            "Grammar is {} ({} productions)",
            analysis.grammar_type.display_name(),
            grammar.productions.len()
        );

        let mut chain = grammar_to_chain(&grammar)?;
        if let Some(stem) = file.file_stem().and_then(|s| s.to_str()) {
            chain = chain.with_name(stem);
        }

        let mut stdout = std::io::stdout();
        match output_format {
            OutputFormat::Json => crate::cli::output::output_chain_json(&mut stdout, &chain)?,
            OutputFormat::Table => {
                crate::cli::output::output_grammar_table(&mut stdout, &grammar, None, &analysis)?;
                writeln!(stdout)?;
                crate::cli::output::output_chain_table(&mut stdout, &chain)?;
            }
            OutputFormat::Dot => {
                crate::cli::output::output_dot(&mut stdout, &ChainGraph::from_chain(&chain))?
            }
        }

        Ok(())
    }
}

/// Validate command implementation
pub mod validate {
    use super::*;

    /// Execute the validate command
    pub fn execute(source: SourceType, input: &str) -> Result<()> {
        tracing::info!("Validating chain: {}", input);

        let chain = load_chain(source, input)?;
        let report = chain.validate();
        crate::cli::output::output_validation(&mut std::io::stdout(), &chain, &report)?;

        if report.is_valid() {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "chain has {} error(s)",
                report.errors.len()
            )))
        }
    }
}

/// Samples command implementation
pub mod samples {
    use super::*;
    use crate::source::samples::SAMPLES;

    /// Execute the samples command
    pub fn execute() -> Result<()> {
        crate::cli::output::output_samples(&mut std::io::stdout(), SAMPLES)
    }
}

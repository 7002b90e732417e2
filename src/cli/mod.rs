//! CLI module
//!
//! This module defines the command-line interface using clap and implements
//! the command execution logic.

use crate::generation::GenerationMode;
use crate::{Config, Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;
pub mod output;

/// Markov Chain Learning Tool CLI
#[derive(Parser, Debug)]
#[command(name = "markov-learn")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "MARKOV_LEARN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stationary distribution, structure and convergence of a chain
    Analyze {
        /// Chain file, or sample name with `--source sample`
        input: String,

        /// Where the chain comes from
        #[arg(short, long, value_enum, default_value = "file")]
        source: SourceType,

        /// Convergence threshold (overrides config)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Power iteration cap (overrides config)
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Generate a random walk over the chain
    Generate {
        /// Chain file, or sample name with `--source sample`
        input: String,

        #[arg(short, long, value_enum, default_value = "file")]
        source: SourceType,

        /// Number of visited states, start included (overrides config)
        #[arg(short, long)]
        length: Option<usize>,

        /// Start state id
        #[arg(long)]
        start: Option<String>,

        /// Transition selection mode (overrides config)
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Random seed (overrides config and MARKOV_LEARN_SEED)
        #[arg(long)]
        seed: Option<u64>,

        /// Print only the space-joined state names
        #[arg(long)]
        text: bool,

        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Analyze the language accepted by a labeled chain
    Language {
        /// Chain file, or sample name with `--source sample`
        input: String,

        #[arg(short, long, value_enum, default_value = "file")]
        source: SourceType,

        /// Seed for rejected examples
        #[arg(long)]
        seed: Option<u64>,

        /// Word to run through the automaton (repeatable)
        #[arg(long = "check", value_name = "WORD")]
        check: Vec<String>,

        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Write the regular grammar of a labeled chain
    Grammar {
        /// Chain file, or sample name with `--source sample`
        input: String,

        #[arg(short, long, value_enum, default_value = "file")]
        source: SourceType,

        /// Use state names as terminals and keep the transition probabilities
        #[arg(long)]
        probabilistic: bool,

        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Build a labeled chain from a right-linear grammar file
    FromGrammar {
        /// Grammar text, one `S → aA | ε` rule per line
        file: PathBuf,

        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Check a chain for well-formedness
    Validate {
        /// Chain file, or sample name with `--source sample`
        input: String,

        #[arg(short, long, value_enum, default_value = "file")]
        source: SourceType,
    },

    /// List the built-in sample chains
    Samples,
}

/// Chain source types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceType {
    /// JSON, TOML or edge-list file
    File,
    /// Built-in sample chain
    Sample,
}

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text table
    Table,
    /// DOT format (Graphviz)
    Dot,
}

impl OutputFormat {
    /// CLI flag if given, otherwise the configured default
    pub fn resolve(flag: Option<OutputFormat>, config: &Config) -> Result<OutputFormat> {
        match flag {
            Some(format) => Ok(format),
            None => OutputFormat::from_str(&config.output.format, true).map_err(|_| {
                Error::Config(format!(
                    "Unknown output format '{}' (expected json, table or dot)",
                    config.output.format
                ))
            }),
        }
    }
}

/// Generation modes as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Probabilistic,
    Deterministic,
}

impl From<ModeArg> for GenerationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Probabilistic => GenerationMode::Probabilistic,
            ModeArg::Deterministic => GenerationMode::Deterministic,
        }
    }
}

/// Execute the CLI command
pub fn execute(args: Cli, config: Config) -> Result<()> {
    match args.command {
        Commands::Analyze { .. } => commands::analyze::execute(args, &config),
        Commands::Generate { .. } => commands::generate::execute(args, &config),
        Commands::Language { .. } => commands::language::execute(args, &config),
        Commands::Grammar { .. } => commands::grammar::execute(args, &config),
        Commands::FromGrammar { file, output } => {
            commands::from_grammar::execute(&file, output, &config)
        }
        Commands::Validate { input, source } => commands::validate::execute(source, &input),
        Commands::Samples => commands::samples::execute(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "markov-learn",
            "analyze",
            "weather",
            "--source",
            "sample",
            "--output",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze {
                input,
                source,
                output,
                tolerance,
                ..
            } => {
                assert_eq!(input, "weather");
                assert_eq!(source, SourceType::Sample);
                assert_eq!(output, Some(OutputFormat::Json));
                assert_eq!(tolerance, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_generate_parsing() {
        let cli = Cli::try_parse_from([
            "markov-learn",
            "--config",
            "custom.toml",
            "generate",
            "chain.json",
            "--length",
            "5",
            "--seed",
            "42",
            "--mode",
            "deterministic",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Generate {
                source,
                length,
                seed,
                mode,
                text,
                ..
            } => {
                assert_eq!(source, SourceType::File);
                assert_eq!(length, Some(5));
                assert_eq!(seed, Some(42));
                assert_eq!(mode.map(GenerationMode::from), Some(GenerationMode::Deterministic));
                assert!(!text);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_repeated_checks() {
        let cli = Cli::try_parse_from([
            "markov-learn",
            "language",
            "even-as",
            "-s",
            "sample",
            "--check",
            "aa",
            "--check",
            "ab",
        ])
        .unwrap();

        match cli.command {
            Commands::Language { check, .. } => assert_eq!(check, vec!["aa", "ab"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_grammar_commands_parsing() {
        let cli = Cli::try_parse_from([
            "markov-learn",
            "grammar",
            "weather",
            "--source",
            "sample",
            "--probabilistic",
        ])
        .unwrap();
        match cli.command {
            Commands::Grammar {
                input,
                probabilistic,
                output,
                ..
            } => {
                assert_eq!(input, "weather");
                assert!(probabilistic);
                assert_eq!(output, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli =
            Cli::try_parse_from(["markov-learn", "from-grammar", "even.grammar", "-o", "dot"])
                .unwrap();
        match cli.command {
            Commands::FromGrammar { file, output } => {
                assert_eq!(file, PathBuf::from("even.grammar"));
                assert_eq!(output, Some(OutputFormat::Dot));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_output_format_from_config() {
        let mut config = Config::default();
        assert_eq!(
            OutputFormat::resolve(None, &config).unwrap(),
            OutputFormat::Table
        );
        assert_eq!(
            OutputFormat::resolve(Some(OutputFormat::Dot), &config).unwrap(),
            OutputFormat::Dot
        );

        config.output.format = "JSON".to_string();
        assert_eq!(
            OutputFormat::resolve(None, &config).unwrap(),
            OutputFormat::Json
        );

        config.output.format = "xml".to_string();
        assert!(OutputFormat::resolve(None, &config).is_err());
    }

    #[test]
    fn test_missing_input_is_rejected() {
        assert!(Cli::try_parse_from(["markov-learn", "analyze"]).is_err());
    }
}

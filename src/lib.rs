//! Markov Chain Learning Tool
//!
//! Analysis engine for discrete-time Markov chains and the labeled
//! automata built on top of them.
//!
//! This library provides functionality for:
//! - Loading chains from JSON, TOML and edge-list files or a built-in catalog
//! - Building row-stochastic transition matrices
//! - Computing stationary distributions by power iteration
//! - Classifying chains (irreducible, aperiodic, ergodic, absorbing)
//! - Generating seed-reproducible state sequences
//! - Analyzing the language a labeled chain accepts
//! - Converting between labeled chains and regular grammars

pub mod analysis;
pub mod chain;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod grammar;
pub mod language;
pub mod parser;
pub mod source;

pub use config::Config;
pub use error::{Error, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging with the given log level.
///
/// Logs go to `file` when given, otherwise to stderr so that stdout stays
/// reserved for command output. `RUST_LOG` overrides `level`.
pub fn init_logging(level: &str, file: Option<&std::path::Path>) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(std::sync::Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

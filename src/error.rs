//! This module defines all error types used throughout the application.
//!
//! The analysis routines themselves never fail; these errors come from loading,
//! parsing, configuration and sequence generation.

use crate::grammar::GrammarSyntaxError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Chain document parsing errors
    #[error("Parser error: {0}")]
    Parser(String),

    /// Chain document errors tied to a specific file
    #[error("Chain file error in {file:?}: {message}")]
    ChainFile { file: PathBuf, message: String },

    /// Edge-list syntax errors
    #[error("Syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Unknown built-in sample chain
    #[error("Unknown sample chain '{name}' (available: {available})")]
    UnknownSample { name: String, available: String },

    /// Chain has no states
    #[error("No states in chain")]
    EmptyChain,

    /// Referenced state does not exist
    #[error("Start state {0} not found")]
    StateNotFound(String),

    /// Chain validation failures
    #[error("Validation error: {0}")]
    Validation(String),

    /// Grammar text errors, one per bad line
    #[error("Invalid grammar: {}", join_grammar_errors(.0))]
    Grammar(Vec<GrammarSyntaxError>),

    /// Grammar with alternatives no finite automaton can follow
    #[error("Grammar is not right-linear: {0}")]
    NotRightLinear(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),

    /// Wrapped anyhow errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn join_grammar_errors(errors: &[GrammarSyntaxError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a custom error with a message
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create a parser error
    pub fn parser(msg: impl Into<String>) -> Self {
        Self::Parser(msg.into())
    }

    /// Create a syntax error for a 1-based line number
    pub fn syntax(line: usize, msg: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: msg.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Attach a file path to a parsing error
    pub fn in_file(self, file: impl Into<PathBuf>) -> Self {
        match self {
            Error::Io(_) | Error::ChainFile { .. } => self,
            other => Error::ChainFile {
                file: file.into(),
                message: other.to_string(),
            },
        }
    }
}

// Implement From traits for common external error types

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Parser(format!("TOML error: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parser(format!("JSON error: {}", err))
    }
}

// Helper macros for creating errors

/// Create a custom error with formatting
#[macro_export]
macro_rules! custom_error {
    ($($arg:tt)*) => {
        $crate::error::Error::Custom(format!($($arg)*))
    };
}

/// Bail with a custom error message
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::custom_error!($($arg)*))
    };
}

/// Ensure a condition is true or return error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($($arg)*);
        }
    };
}

//! Language module - labeled chains read as finite automata

pub mod analyzer;
pub mod automaton;

// Re-export key types
pub use analyzer::{
    LanguageAnalysis, LanguageProperties, LanguageType, analyze_language,
    analyze_language_seeded, compute_regular_expression, is_empty_language, is_finite_language,
    is_universal_language,
};
pub use automaton::Automaton;

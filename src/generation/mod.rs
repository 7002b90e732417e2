//! Generation module - seed-reproducible walks over a chain

pub mod generator;
pub mod rng;

// Re-export key types
pub use generator::{
    Generation, GenerationMode, GenerationOptions, GenerationResult, PathStep, TextResult,
    generate_text, generate_text_string, try_generate,
};
pub use rng::{LcgRng, RandomSource};

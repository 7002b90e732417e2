//! Source module - where chains come from
//!
//! A chain is either read from a document on disk or taken from the
//! built-in catalog of teaching examples.

use crate::Result;
use crate::chain::MarkovChain;
use crate::cli::SourceType;
use std::path::PathBuf;

pub mod file;
pub mod samples;

pub use file::FileSource;
pub use samples::SampleSource;

/// Provider of a single chain
pub trait ChainSource {
    fn load(&self) -> Result<MarkovChain>;

    /// Human-readable origin for log messages
    fn describe(&self) -> String;
}

/// Create a chain source for `input` (a path or a sample name)
pub fn create_source(source_type: SourceType, input: &str) -> Result<Box<dyn ChainSource>> {
    match source_type {
        SourceType::File => Ok(Box::new(FileSource::new(PathBuf::from(input)))),
        SourceType::Sample => Ok(Box::new(SampleSource::new(input)?)),
    }
}

/// Load a chain, logging where it came from
pub fn load_chain(source_type: SourceType, input: &str) -> Result<MarkovChain> {
    let source = create_source(source_type, input)?;
    tracing::info!("Loading chain from {}", source.describe());
    let chain = source.load()?;
    tracing::info!(
        "Loaded {} states and {} transitions",
        chain.states.len(),
        chain.transitions.len()
    );
    Ok(chain)
}

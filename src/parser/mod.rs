//! Parser module - chain documents in JSON, TOML and edge-list form

use crate::Result;
use crate::chain::MarkovChain;
use std::path::Path;

pub mod edge_list;

// Re-export key types
pub use edge_list::EdgeListParser;

/// Parser trait for chain documents
pub trait ChainParser {
    fn parse(&self, input: &str) -> Result<MarkovChain>;

    /// Short format name used in log messages
    fn format(&self) -> &'static str;
}

/// `{ "states": [...], "transitions": [...] }` as exchanged with the web app
pub struct JsonParser;

impl ChainParser for JsonParser {
    fn parse(&self, input: &str) -> Result<MarkovChain> {
        Ok(serde_json::from_str(input)?)
    }

    fn format(&self) -> &'static str {
        "json"
    }
}

/// `[[states]]` and `[[transitions]]` tables
pub struct TomlParser;

impl ChainParser for TomlParser {
    fn parse(&self, input: &str) -> Result<MarkovChain> {
        Ok(toml::from_str(input)?)
    }

    fn format(&self) -> &'static str {
        "toml"
    }
}

/// Choose a parser from the file extension. Unknown extensions are edge lists.
pub fn parser_for_path(path: &Path) -> Box<dyn ChainParser> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => Box::new(JsonParser),
        Some("toml") => Box::new(TomlParser),
        _ => Box::new(EdgeListParser::new()),
    }
}

/// Read and parse a chain document, attaching the path to any error
pub fn parse_chain_file(path: &Path) -> Result<MarkovChain> {
    let contents = std::fs::read_to_string(path)?;
    let parser = parser_for_path(path);
    tracing::debug!("Parsing {:?} as {}", path, parser.format());

    let mut chain = parser.parse(&contents).map_err(|e| e.in_file(path))?;
    if chain.name.is_none() {
        chain.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string);
    }
    Ok(chain)
}

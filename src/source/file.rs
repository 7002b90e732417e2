//! Chain documents on disk

use super::ChainSource;
use crate::Result;
use crate::chain::MarkovChain;
use crate::parser;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ChainSource for FileSource {
    fn load(&self) -> Result<MarkovChain> {
        parser::parse_chain_file(&self.path)
    }

    fn describe(&self) -> String {
        format!("file {:?}", self.path)
    }
}

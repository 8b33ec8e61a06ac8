//! Flat-file persistence for the raw block dataset.

use crate::errors::SourceResult;
use feescope_mechanics::BlockRecord;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// Saves and loads the raw dataset as pretty-printed JSON.
///
/// The store holds raw records only: derived metrics are recomputed from the
/// raw sequence on every run and never persisted. All wei-denominated fields
/// round-trip as JSON integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStore {
    path: PathBuf,
}

impl BlockStore {
    /// Creates a store at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The dataset path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the records to the dataset file, creating parent directories
    /// as needed and replacing any previous dataset.
    pub fn save(&self, blocks: &[BlockRecord]) -> SourceResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(blocks)?)?;
        info!(blocks = blocks.len(), path = %self.path.display(), "saved dataset");
        Ok(())
    }

    /// Reads the records back from the dataset file, in stored order.
    pub fn load(&self) -> SourceResult<Vec<BlockRecord>> {
        let blocks: Vec<BlockRecord> = serde_json::from_slice(&fs::read(&self.path)?)?;
        info!(blocks = blocks.len(), path = %self.path.display(), "loaded dataset");
        Ok(blocks)
    }
}

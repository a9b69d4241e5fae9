mod fixed;
mod rabin;

pub use fixed::FixedSizeChunkEngine;
pub use rabin::{RabinChunkEngine, RabinChunker};

use crate::config::TesseraConfig;
use crate::error::Result;
use crate::types::{Chunk, ChunkStrategy};
use std::path::Path;

/// Trait for splitting files into chunk boundaries.
///
/// Engines report boundaries only; computing content addresses over the
/// reported ranges is the consumer's job.
pub trait ChunkEngine: Send + Sync {
    /// Split a file into an exact, ordered partition of chunk boundaries.
    fn chunk_file(&self, path: &Path) -> Result<Vec<Chunk>>;
}

/// Build the chunk engine selected by the configuration.
///
/// Validates the configuration once and returns an owned engine value; the
/// caller decides how to share it.
pub fn build_engine(config: &TesseraConfig) -> Result<Box<dyn ChunkEngine>> {
    match config.strategy {
        ChunkStrategy::Rabin => Ok(Box::new(RabinChunkEngine::new(config.clone())?)),
        ChunkStrategy::Fixed { size } => Ok(Box::new(FixedSizeChunkEngine::new(size)?)),
    }
}

use crate::chunk::ChunkEngine;
use crate::error::{Result, TesseraError};
use crate::types::Chunk;
use std::path::Path;

/// Fixed-size chunking engine.
///
/// The trivial baseline: boundaries every `chunk_size` bytes regardless of
/// content. Only the file length matters, so no data is read.
pub struct FixedSizeChunkEngine {
    chunk_size: usize,
}

impl FixedSizeChunkEngine {
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(TesseraError::Config(
                "fixed chunk size must be at least 1".to_string(),
            ));
        }
        Ok(Self { chunk_size })
    }
}

impl ChunkEngine for FixedSizeChunkEngine {
    fn chunk_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        let total = std::fs::metadata(path)
            .map_err(|e| TesseraError::Chunking(format!("failed to stat {}: {e}", path.display())))?
            .len();

        let mut chunks = Vec::new();
        let mut offset = 0u64;
        while offset < total {
            let length = (total - offset).min(self.chunk_size as u64) as usize;
            chunks.push(Chunk { offset, length });
            offset += length as u64;
        }
        Ok(chunks)
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// A chunk boundary produced by a chunking engine.
///
/// A chunk has no identity beyond its byte range: content addressing (if
/// any) is computed by the collaborator that consumes these boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chunk {
    /// Byte position in the overall stream where the chunk starts.
    pub offset: u64,
    /// Number of bytes in the chunk. Always positive.
    pub length: usize,
}

impl Chunk {
    /// Exclusive end offset of the chunk.
    pub fn end(&self) -> u64 {
        self.offset + self.length as u64
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{} ({} bytes)", self.offset, self.end(), self.length)
    }
}

/// Chunking strategy selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ChunkStrategy {
    /// Content-defined boundaries from the Rabin fingerprint detector.
    Rabin,
    /// Fixed-size boundaries every `size` bytes.
    Fixed { size: usize },
}

impl Default for ChunkStrategy {
    fn default() -> Self {
        ChunkStrategy::Rabin
    }
}

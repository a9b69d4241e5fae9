//! tessera-core — content-defined chunking engine.
//!
//! Splits byte streams into variable-length, content-aligned chunks so that
//! local edits do not shift boundaries elsewhere in the stream. The engine
//! is a Rabin rolling fingerprint over a configurable GF(2^d) field plus a
//! min/avg/max-bounded boundary policy; downstream deduplicating stores
//! consume the emitted `(offset, length)` boundaries and address content
//! however they see fit.
//!
//! Everything here is synchronous pure computation: a constructed field is
//! immutable and shareable, while each stream owns its own
//! [`RabinChunker`].

pub mod chunk;
pub mod config;
pub mod error;
pub mod field;
pub mod fingerprint;
pub mod types;

pub use chunk::{ChunkEngine, FixedSizeChunkEngine, RabinChunkEngine, RabinChunker, build_engine};
pub use config::{ChunkerConfig, FieldConfig, TesseraConfig};
pub use error::{Result, TesseraError};
pub use field::GaloisField;
pub use fingerprint::RabinFingerprint;
pub use types::{Chunk, ChunkStrategy};

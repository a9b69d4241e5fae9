use crate::chunk::ChunkEngine;
use crate::config::TesseraConfig;
use crate::error::{Result, TesseraError};
use crate::fingerprint::RabinFingerprint;
use crate::types::Chunk;
use std::io::Read;
use std::path::Path;

/// Streaming content-defined chunk boundary detector.
///
/// Bytes are fed through a Rabin rolling fingerprint; a boundary is emitted
/// where the fingerprint's low `avg_chunk_bits` bits equal the configured
/// match value, subject to hard minimum/maximum chunk sizes. Because the
/// test depends only on the window's content, an insertion or deletion in
/// one region of a stream leaves boundaries elsewhere in place.
///
/// One detector tracks one stream. `feed` may be called with any input
/// granularity without changing the emitted boundaries.
#[derive(Debug, Clone)]
pub struct RabinChunker {
    fingerprint: RabinFingerprint,
    min_chunk_size: usize,
    max_chunk_size: usize,
    boundary_mask: u64,
    match_value: u64,
    /// Start offset of the chunk currently being accumulated.
    offset: u64,
    /// Bytes accumulated since the last boundary.
    distance: usize,
    finished: bool,
}

impl RabinChunker {
    /// Validate the configuration and construct a detector.
    ///
    /// This is the sole validation point: a detector that constructs
    /// successfully cannot fail afterwards except by use after `finish`.
    pub fn new(config: &TesseraConfig) -> Result<Self> {
        let field = config.field.build()?;
        config.chunker.validate(field.degree())?;
        let fingerprint = RabinFingerprint::new(field, config.chunker.window_len)?;

        tracing::debug!(
            degree = config.field.degree,
            window_len = config.chunker.window_len,
            min_chunk_size = config.chunker.min_chunk_size,
            max_chunk_size = config.chunker.max_chunk_size,
            avg_chunk_bits = config.chunker.avg_chunk_bits,
            "constructed rabin chunker"
        );

        Ok(RabinChunker {
            fingerprint,
            min_chunk_size: config.chunker.min_chunk_size,
            max_chunk_size: config.chunker.max_chunk_size,
            boundary_mask: config.chunker.boundary_mask(),
            match_value: config.chunker.avg_chunk_match_value,
            offset: 0,
            distance: 0,
            finished: false,
        })
    }

    /// Consume a buffer and return the boundaries completed inside it.
    ///
    /// State advances monotonically: no boundary is ever reported twice,
    /// and successive calls continue where the previous one stopped.
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<Chunk>> {
        if self.finished {
            return Err(TesseraError::StreamFinished);
        }

        let mut chunks = Vec::new();
        for &byte in data {
            let value = self.fingerprint.push(byte);
            self.distance += 1;

            if self.distance < self.min_chunk_size {
                continue;
            }
            if self.distance == self.max_chunk_size
                || value & self.boundary_mask == self.match_value
            {
                chunks.push(self.cut());
            }
        }
        Ok(chunks)
    }

    /// Flush the trailing partial chunk, if any, and seal the stream.
    ///
    /// The final chunk may be shorter than the configured minimum. Further
    /// `feed` or `finish` calls fail until `reset`.
    pub fn finish(&mut self) -> Result<Option<Chunk>> {
        if self.finished {
            return Err(TesseraError::StreamFinished);
        }
        self.finished = true;
        if self.distance == 0 {
            Ok(None)
        } else {
            Ok(Some(self.cut()))
        }
    }

    /// Return to the start-of-stream state, keeping the precomputed tables.
    pub fn reset(&mut self) {
        self.fingerprint.reset();
        self.offset = 0;
        self.distance = 0;
        self.finished = false;
    }

    /// Total bytes consumed since construction or the last `reset`.
    pub fn bytes_consumed(&self) -> u64 {
        self.offset + self.distance as u64
    }

    fn cut(&mut self) -> Chunk {
        let chunk = Chunk {
            offset: self.offset,
            length: self.distance,
        };
        tracing::trace!(offset = chunk.offset, length = chunk.length, "chunk boundary");
        self.offset += self.distance as u64;
        self.distance = 0;
        chunk
    }
}

/// File-level engine driving a [`RabinChunker`] over buffered reads.
pub struct RabinChunkEngine {
    config: TesseraConfig,
}

impl RabinChunkEngine {
    /// Validate the configuration once and keep it for per-file detectors.
    pub fn new(config: TesseraConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl ChunkEngine for RabinChunkEngine {
    fn chunk_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        let mut file = std::fs::File::open(path).map_err(|e| {
            TesseraError::Chunking(format!("failed to open {}: {e}", path.display()))
        })?;

        let mut chunker = RabinChunker::new(&self.config)?;
        let mut chunks = Vec::new();
        let mut buf = vec![0u8; 64 * 1024];

        loop {
            let n = match file.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => return Err(TesseraError::Chunking(format!("read error: {e}"))),
            };
            chunks.extend(chunker.feed(&buf[..n])?);
        }
        if let Some(tail) = chunker.finish()? {
            chunks.push(tail);
        }

        tracing::debug!(
            path = %path.display(),
            chunks = chunks.len(),
            bytes = chunker.bytes_consumed(),
            "chunked file"
        );
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChunkerConfig, FieldConfig};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config(
        window_len: usize,
        min: usize,
        max: usize,
        bits: u32,
        match_value: u64,
    ) -> TesseraConfig {
        TesseraConfig {
            field: FieldConfig {
                degree: 8,
                polynomial: 0x11D,
            },
            chunker: ChunkerConfig {
                window_len,
                min_chunk_size: min,
                max_chunk_size: max,
                avg_chunk_bits: bits,
                avg_chunk_match_value: match_value,
            },
            ..TesseraConfig::default()
        }
    }

    fn assert_partition(chunks: &[Chunk], total: usize) {
        let mut expected_offset = 0u64;
        for chunk in chunks {
            assert_eq!(chunk.offset, expected_offset);
            assert!(chunk.length > 0);
            expected_offset += chunk.length as u64;
        }
        assert_eq!(expected_offset, total as u64);
    }

    #[test]
    fn always_matching_stream_cuts_at_min() {
        // An all-zero stream keeps the fingerprint at zero, so with match
        // value zero every chunk closes as soon as the minimum is reached.
        let mut chunker = RabinChunker::new(&config(4, 7, 100, 3, 0)).unwrap();
        let chunks = chunker.feed(&[0u8; 25]).unwrap();
        assert_eq!(
            chunks,
            vec![
                Chunk { offset: 0, length: 7 },
                Chunk { offset: 7, length: 7 },
                Chunk { offset: 14, length: 7 },
            ]
        );
        let tail = chunker.finish().unwrap();
        assert_eq!(tail, Some(Chunk { offset: 21, length: 4 }));
    }

    #[test]
    fn never_matching_stream_forces_at_max() {
        // An all-zero stream never matches a nonzero target, so every
        // boundary is forced at the maximum.
        let mut chunker = RabinChunker::new(&config(4, 2, 9, 3, 1)).unwrap();
        let chunks = chunker.feed(&[0u8; 27]).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.length == 9));
        assert_partition(&chunks, 27);
        assert_eq!(chunker.finish().unwrap(), None);
    }

    #[test]
    fn trailing_partial_chunk_may_undercut_min() {
        let mut chunker = RabinChunker::new(&config(4, 5, 8, 3, 1)).unwrap();
        let mut chunks = chunker.feed(&[0u8; 19]).unwrap();
        chunks.extend(chunker.finish().unwrap());
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].length, 3);
        assert_partition(&chunks, 19);
    }

    #[test]
    fn equal_min_max_degenerates_to_fixed() {
        let mut chunker = RabinChunker::new(&config(4, 5, 5, 3, 1)).unwrap();
        let chunks = chunker.feed(&[0u8; 15]).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.length == 5));
    }

    #[test]
    fn feed_granularity_does_not_change_boundaries() {
        let data: Vec<u8> = (0..4096u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
            .collect();
        let cfg = config(16, 32, 256, 6, 0);

        let mut all_at_once = RabinChunker::new(&cfg).unwrap();
        let mut expected = all_at_once.feed(&data).unwrap();
        expected.extend(all_at_once.finish().unwrap());

        let mut byte_by_byte = RabinChunker::new(&cfg).unwrap();
        let mut actual = Vec::new();
        for &b in &data {
            actual.extend(byte_by_byte.feed(&[b]).unwrap());
        }
        actual.extend(byte_by_byte.finish().unwrap());

        assert_eq!(expected, actual);
        assert_partition(&actual, data.len());
    }

    #[test]
    fn lengths_respect_configured_bounds() {
        let data: Vec<u8> = (0..8192u32)
            .map(|i| (i.wrapping_mul(2654435761).wrapping_add(12345) >> 11) as u8)
            .collect();
        let mut chunker = RabinChunker::new(&config(16, 24, 192, 5, 0)).unwrap();
        let mut chunks = chunker.feed(&data).unwrap();
        chunks.extend(chunker.finish().unwrap());

        assert_partition(&chunks, data.len());
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.length >= 24 && chunk.length <= 192);
        }
        assert!(chunks.last().unwrap().length <= 192);
    }

    #[test]
    fn empty_stream_yields_no_chunk() {
        let mut chunker = RabinChunker::new(&config(4, 2, 8, 2, 0)).unwrap();
        assert_eq!(chunker.feed(&[]).unwrap(), vec![]);
        assert_eq!(chunker.finish().unwrap(), None);
    }

    #[test]
    fn use_after_finish_is_rejected() {
        let mut chunker = RabinChunker::new(&config(4, 2, 8, 2, 0)).unwrap();
        chunker.feed(&[1, 2, 3]).unwrap();
        chunker.finish().unwrap();
        assert!(matches!(
            chunker.feed(&[4]),
            Err(TesseraError::StreamFinished)
        ));
        assert!(matches!(
            chunker.finish(),
            Err(TesseraError::StreamFinished)
        ));
    }

    #[test]
    fn reset_reuses_tables_for_a_new_stream() {
        let data: Vec<u8> = (0..512u32).map(|i| (i * 7 % 251) as u8).collect();
        let cfg = config(8, 16, 128, 4, 0);

        let mut chunker = RabinChunker::new(&cfg).unwrap();
        let mut first = chunker.feed(&data).unwrap();
        first.extend(chunker.finish().unwrap());

        chunker.reset();
        let mut second = chunker.feed(&data).unwrap();
        second.extend(chunker.finish().unwrap());

        assert_eq!(first, second);
    }

    #[test]
    fn reference_scenario_is_deterministic_and_bounded() {
        // degree 8, x^8+x^4+x^3+x^2+1, window 4, min 2, max 8, 2 low bits
        // against 0, over the bytes 1..=10.
        let cfg = config(4, 2, 8, 2, 0);
        let data: Vec<u8> = (1..=10).collect();

        let mut chunker = RabinChunker::new(&cfg).unwrap();
        let mut first = chunker.feed(&data).unwrap();
        first.extend(chunker.finish().unwrap());

        let mut rerun = RabinChunker::new(&cfg).unwrap();
        let mut second = rerun.feed(&data).unwrap();
        second.extend(rerun.finish().unwrap());

        assert_eq!(first, second);
        assert_partition(&first, data.len());
        for chunk in &first[..first.len() - 1] {
            assert!(chunk.length >= 2 && chunk.length <= 8);
        }
    }

    #[test]
    fn bytes_consumed_tracks_input() {
        let mut chunker = RabinChunker::new(&config(4, 2, 8, 2, 0)).unwrap();
        chunker.feed(&[0u8; 13]).unwrap();
        assert_eq!(chunker.bytes_consumed(), 13);
    }

    #[test]
    fn engine_partitions_a_file() {
        let mut file = NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0..100_000u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 7) as u8)
            .collect();
        file.write_all(&data).unwrap();

        let engine = RabinChunkEngine::new(config(16, 64, 1024, 8, 0)).unwrap();
        let chunks = engine.chunk_file(file.path()).unwrap();

        assert!(chunks.len() > 1);
        assert_partition(&chunks, data.len());
    }

    #[test]
    fn engine_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let engine = RabinChunkEngine::new(config(16, 64, 1024, 8, 0)).unwrap();
        assert!(engine.chunk_file(file.path()).unwrap().is_empty());
    }

    #[test]
    fn engine_rejects_invalid_config() {
        assert!(RabinChunkEngine::new(config(0, 64, 1024, 8, 0)).is_err());
    }
}

use crate::error::{Result, TesseraError};
use crate::field::GaloisField;
use crate::types::ChunkStrategy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level tessera configuration stored as TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TesseraConfig {
    #[serde(default)]
    pub field: FieldConfig,
    #[serde(default)]
    pub chunker: ChunkerConfig,
    /// Engine selection.
    #[serde(default)]
    pub strategy: ChunkStrategy,
}

/// Galois field parameters for the rolling fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Bit-width of field elements.
    #[serde(default = "default_degree")]
    pub degree: u32,
    /// Field-defining polynomial, including the monic `x^degree` term.
    /// Fewer set bits multiply faster; primitivity is not verified here.
    #[serde(default = "default_polynomial")]
    pub polynomial: u64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            degree: default_degree(),
            polynomial: default_polynomial(),
        }
    }
}

impl FieldConfig {
    /// Validate the parameters and construct the field.
    pub fn build(&self) -> Result<GaloisField> {
        GaloisField::new(self.degree, self.polynomial)
    }
}

fn default_degree() -> u32 {
    53
}

fn default_polynomial() -> u64 {
    0x3DF305DFB2A805
}

/// Boundary-policy parameters for the content-defined chunker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Rolling window size in bytes.
    #[serde(default = "default_window_len")]
    pub window_len: usize,
    /// Minimum emitted chunk length; boundary tests are disabled below it.
    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,
    /// Maximum emitted chunk length; a boundary is forced at it.
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
    /// Low-order fingerprint bits examined by the boundary test. Expected
    /// average chunk size is about `2^avg_chunk_bits` bytes.
    #[serde(default = "default_avg_chunk_bits")]
    pub avg_chunk_bits: u32,
    /// Target bit pattern for the boundary test.
    #[serde(default)]
    pub avg_chunk_match_value: u64,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            window_len: default_window_len(),
            min_chunk_size: default_min_chunk_size(),
            max_chunk_size: default_max_chunk_size(),
            avg_chunk_bits: default_avg_chunk_bits(),
            avg_chunk_match_value: 0,
        }
    }
}

fn default_window_len() -> usize {
    64
}

fn default_min_chunk_size() -> usize {
    64 * 1024
}

fn default_max_chunk_size() -> usize {
    1024 * 1024
}

fn default_avg_chunk_bits() -> u32 {
    18
}

impl ChunkerConfig {
    /// Check the boundary-policy constraints against a field degree.
    pub fn validate(&self, degree: u32) -> Result<()> {
        if self.window_len == 0 {
            return Err(TesseraError::Config(
                "window_len must be at least 1".to_string(),
            ));
        }
        if self.min_chunk_size == 0 {
            return Err(TesseraError::Config(
                "min_chunk_size must be at least 1".to_string(),
            ));
        }
        if self.max_chunk_size < self.min_chunk_size {
            return Err(TesseraError::Config(format!(
                "max_chunk_size {} is below min_chunk_size {}",
                self.max_chunk_size, self.min_chunk_size
            )));
        }
        if self.avg_chunk_bits > degree {
            return Err(TesseraError::Config(format!(
                "avg_chunk_bits {} exceeds field degree {degree}",
                self.avg_chunk_bits
            )));
        }
        if self.avg_chunk_bits < 64 && self.avg_chunk_match_value >> self.avg_chunk_bits != 0 {
            return Err(TesseraError::Config(format!(
                "avg_chunk_match_value {:#x} does not fit in {} bits",
                self.avg_chunk_match_value, self.avg_chunk_bits
            )));
        }
        Ok(())
    }

    /// Bitmask selecting the fingerprint bits the boundary test examines.
    pub fn boundary_mask(&self) -> u64 {
        (1u64 << self.avg_chunk_bits) - 1
    }
}

impl TesseraConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TesseraError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: TesseraConfig =
            toml::from_str(&content).map_err(|e| TesseraError::TomlDe(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| TesseraError::TomlSer(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate every construction-time constraint at once.
    pub fn validate(&self) -> Result<()> {
        let field = self.field.build()?;
        self.chunker.validate(field.degree())?;
        if let ChunkStrategy::Fixed { size } = self.strategy {
            if size == 0 {
                return Err(TesseraError::Config(
                    "fixed chunk size must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

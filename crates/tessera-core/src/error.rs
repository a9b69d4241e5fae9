use thiserror::Error;

#[derive(Debug, Error)]
pub enum TesseraError {
    // IO
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Config
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file not found at {0}")]
    ConfigNotFound(String),

    // Chunking
    #[error("Chunking error: {0}")]
    Chunking(String),

    #[error("Stream already finished — create a new chunker or call reset()")]
    StreamFinished,

    // Serialization
    #[error("TOML deserialization error: {0}")]
    TomlDe(String),

    #[error("TOML serialization error: {0}")]
    TomlSer(String),
}

pub type Result<T> = std::result::Result<T, TesseraError>;

//! Error types for the conversion pipeline.

/// Error types for YM-to-SN conversion operations.
#[derive(thiserror::Error, Debug)]
pub enum Ym2snError {
    /// Error while parsing an input YM container.
    #[error("parse error: {0}")]
    ParseError(String),

    /// IO error from filesystem access.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A compressed payload was detected but decompression is not implemented.
    #[error("decompression error: {0}")]
    DecompressionError(String),

    /// Invalid configuration; fatal before any frame is processed.
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// Internal invariant violated while serializing VGM output.
    #[error("VGM encode error: {0}")]
    VgmEncodeError(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl From<String> for Ym2snError {
    fn from(msg: String) -> Self {
        Ym2snError::Other(msg)
    }
}

impl From<&str> for Ym2snError {
    fn from(msg: &str) -> Self {
        Ym2snError::Other(msg.to_string())
    }
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, Ym2snError>;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CipherError {
    #[error("Cannot read input {}: {source}", path.display())]
    InputIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write output {}: {source}", path.display())]
    OutputIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Body length {len} is not a positive multiple of the {block_size}-byte block size")]
    BlockAlignment { len: usize, block_size: usize },

    #[error("Decryption failed: bad padding (wrong passphrase, wrong IV or corrupted data)")]
    PaddingOrKey,

    #[error("Unsupported mode: {0}. Must be ECB or CBC")]
    UnsupportedMode(String),

    #[error("Unsupported operation: {0}. Must be encrypt or decrypt")]
    UnsupportedOperation(String),

    #[error("Block {index} failed ({failed} block(s) failed in total): {reason}")]
    BlockFailure {
        index: usize,
        failed: usize,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CipherError {
    /// Name of the pipeline stage that produced this error
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InputIo { .. } => "read",
            Self::OutputIo { .. } => "write",
            Self::MalformedHeader(_) => "split",
            Self::KeyDerivation(_) => "derive",
            Self::BlockAlignment { .. } | Self::BlockFailure { .. } => "schedule",
            Self::PaddingOrKey => "cipher",
            Self::UnsupportedMode(_) | Self::UnsupportedOperation(_) => "parse",
            Self::Config(_) | Self::Json(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, CipherError>;

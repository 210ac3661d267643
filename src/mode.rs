use crate::error::{CipherError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Block chaining mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Independent-block (ECB). Blocks may be processed in parallel.
    Ecb,
    /// Chained-block (CBC). Strictly sequential, uses the derived IV.
    #[default]
    Cbc,
}

impl Mode {
    /// Whether the derived IV takes part in the transform
    pub fn uses_iv(self) -> bool {
        matches!(self, Self::Cbc)
    }

    /// Whether blocks can be handed to the parallel scheduler
    pub fn is_parallel(self) -> bool {
        matches!(self, Self::Ecb)
    }
}

impl std::str::FromStr for Mode {
    type Err = CipherError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ecb" => Ok(Self::Ecb),
            "cbc" => Ok(Self::Cbc),
            _ => Err(CipherError::UnsupportedMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ecb => f.write_str("ECB"),
            Self::Cbc => f.write_str("CBC"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    #[default]
    Encrypt,
    Decrypt,
}

impl std::str::FromStr for Operation {
    type Err = CipherError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "encrypt" => Ok(Self::Encrypt),
            "decrypt" => Ok(Self::Decrypt),
            _ => Err(CipherError::UnsupportedOperation(s.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypt => f.write_str("encrypt"),
            Self::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// How the payload is divided into a preserved header and a transformed body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PayloadLayout {
    /// Bitmap file: everything before the pixel data offset is kept verbatim
    #[default]
    Bitmap,
    /// No header, the whole payload is transformed
    Raw,
}

impl std::str::FromStr for PayloadLayout {
    type Err = CipherError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bitmap" | "bmp" => Ok(Self::Bitmap),
            "raw" => Ok(Self::Raw),
            _ => Err(CipherError::Config(format!("unknown payload layout: {}", s))),
        }
    }
}

impl fmt::Display for PayloadLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitmap => f.write_str("bitmap"),
            Self::Raw => f.write_str("raw"),
        }
    }
}

/// Where the key derivation salt comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SaltPolicy {
    /// The configured (compiled-in by default) salt; nothing extra is stored
    #[default]
    Fixed,
    /// A random salt per encryption, stored between header and ciphertext
    Embedded,
}

impl fmt::Display for SaltPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => f.write_str("fixed"),
            Self::Embedded => f.write_str("embedded"),
        }
    }
}

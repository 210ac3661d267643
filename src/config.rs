use crate::error::{CipherError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Salt compiled into the binary. Anyone who knows it can reproduce the key
/// schedule for a given passphrase; see `SaltPolicy::Embedded`.
pub const DEFAULT_SALT: &str = "OpenMP_AES_Salt";

/// Appended to the base salt for the IV derivation
pub const DEFAULT_IV_SUFFIX: &str = "IV";

pub const DEFAULT_ITERATIONS: u32 = 10_000;
pub const MIN_ITERATIONS: u32 = 10_000;
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Tunables shared by every invocation in a process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherConfig {
    /// PBKDF2 rounds for both the key and the IV
    pub iterations: u32,
    /// Base salt for the key derivation
    pub salt: String,
    /// Suffix that turns the base salt into the IV salt
    pub iv_suffix: String,
    /// Worker pool size, `None` for one worker per logical CPU
    pub threads: Option<usize>,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            salt: DEFAULT_SALT.to_string(),
            iv_suffix: DEFAULT_IV_SUFFIX.to_string(),
            threads: None,
        }
    }
}

impl CipherConfig {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(CipherError::Config(format!(
                "iterations must be between {} and {}, got {}",
                MIN_ITERATIONS, MAX_ITERATIONS, self.iterations
            )));
        }
        if self.salt.is_empty() {
            return Err(CipherError::Config("salt must not be empty".into()));
        }
        if self.iv_suffix.is_empty() {
            return Err(CipherError::Config("iv_suffix must not be empty".into()));
        }
        if self.threads == Some(0) {
            return Err(CipherError::Config("threads must be at least 1".into()));
        }
        Ok(())
    }

    /// Deserialize config from JSON bytes; missing fields take their defaults
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|source| CipherError::InputIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&data)
    }
}

//! Passphrase to key/IV derivation.
//!
//! Two PBKDF2-HMAC-SHA256 runs over the same passphrase:
//!
//! ```text
//! key = PBKDF2(passphrase, salt,          iterations, 32)
//! iv  = PBKDF2(passphrase, salt || suffix, iterations, 16)
//! ```
//!
//! The key never depends on the suffix, so the two outputs are separate
//! derivations of one secret.

use crate::config::{CipherConfig, MIN_ITERATIONS};
use crate::error::{CipherError, Result};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;

pub type Key = [u8; KEY_LEN];
pub type Iv = [u8; IV_LEN];

/// Derived key and IV for one invocation, wiped on drop
#[derive(PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    pub key: Key,
    pub iv: Iv,
}

impl KeyMaterial {
    pub fn from_parts(key: Key, iv: Iv) -> Self {
        Self { key, iv }
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial { .. }")
    }
}

/// Derive key and IV with the given parameters
pub fn derive(
    passphrase: &[u8],
    salt: &[u8],
    iv_suffix: &[u8],
    iterations: u32,
) -> Result<KeyMaterial> {
    if iterations < MIN_ITERATIONS {
        return Err(CipherError::KeyDerivation(format!(
            "{} iterations is below the minimum of {}",
            iterations, MIN_ITERATIONS
        )));
    }

    // Written in place so no unwiped copy of the output is left on the stack
    let mut material = KeyMaterial::from_parts([0u8; KEY_LEN], [0u8; IV_LEN]);
    pbkdf2_sha256(passphrase, salt, iterations, &mut material.key)
        .map_err(|e| CipherError::KeyDerivation(format!("key: {}", e)))?;

    let mut iv_salt = Vec::with_capacity(salt.len() + iv_suffix.len());
    iv_salt.extend_from_slice(salt);
    iv_salt.extend_from_slice(iv_suffix);

    pbkdf2_sha256(passphrase, &iv_salt, iterations, &mut material.iv)
        .map_err(|e| CipherError::KeyDerivation(format!("iv: {}", e)))?;

    Ok(material)
}

/// Derive key and IV from a base salt using the configured suffix and rounds
pub fn derive_with_config(
    passphrase: &[u8],
    salt: &[u8],
    config: &CipherConfig,
) -> Result<KeyMaterial> {
    derive(passphrase, salt, config.iv_suffix.as_bytes(), config.iterations)
}

/// Raw PBKDF2-HMAC-SHA256 into `out`
///
/// Output lengths are bounded by `(2^32 - 1) * 32` bytes; larger requests fail.
pub fn pbkdf2_sha256(
    passphrase: &[u8],
    salt: &[u8],
    iterations: u32,
    out: &mut [u8],
) -> std::result::Result<(), String> {
    if iterations == 0 {
        return Err("iterations must be at least 1".into());
    }
    if out.len() as u64 > u32::MAX as u64 * 32 {
        return Err(format!("requested {} bytes, more than PBKDF2 can produce", out.len()));
    }
    pbkdf2::<Hmac<Sha256>>(passphrase, salt, iterations, out).map_err(|e| e.to_string())
}
